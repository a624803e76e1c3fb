// src/config.rs
use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Message for a configuration without any worker threads.
pub(crate) const ZERO_WORKERS: &str = "workers must be at least 1";

/// Default target chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Tuning knobs for a run. Results do not depend on either value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Approximate bytes per chunk; chunks always extend to a line end.
    pub chunk_size: u64,
    /// Number of worker threads.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: num_cpus::get(),
        }
    }
}

impl Config {
    /// Load from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply explicit overrides on top of this config.
    pub fn with_overrides(mut self, chunk_size: Option<u64>, workers: Option<usize>) -> Self {
        if let Some(chunk_size) = chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(workers) = workers {
            self.workers = workers;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config(ZERO_WORKERS.into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_all_cores() {
        let config = Config::default();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.workers, num_cpus::get());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_keys_override_defaults() {
        let config = Config::from_yaml_str("chunk_size: 4096\n").unwrap();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.workers, num_cpus::get());

        let config = Config::from_yaml_str("chunk_size: 10\nworkers: 2\n").unwrap();
        assert_eq!(config, Config { chunk_size: 10, workers: 2 });
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_yaml_str("chunk: 10\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn overrides_win_and_zero_workers_fail_validation() {
        let config = Config::default().with_overrides(Some(1), Some(0));
        assert_eq!(config.chunk_size, 1);
        match config.validate() {
            Err(Error::Config(msg)) => assert_eq!(msg, ZERO_WORKERS),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
