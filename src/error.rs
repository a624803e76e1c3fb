// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Field;

/// Errors raised by the analysis pipeline.
///
/// Everything here is fatal: a malformed field inside a row never becomes an
/// `Error`, it degrades to an absent value in [`crate::record::Record`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {0} has no header line")]
    MissingHeader(PathBuf),

    /// No header column matched the exact names or the fallback pattern.
    #[error("no column found for {field}: tried {known:?} and pattern \"{pattern}\"")]
    MissingColumn {
        field: Field,
        known: Vec<String>,
        pattern: String,
    },

    #[error("invalid column pattern \"{pattern}\" for {field}: {source}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A worker failed on one chunk; the whole run is aborted.
    #[error("chunk #{index} (offset {start}, {len} bytes) failed: {source}")]
    Chunk {
        index: usize,
        start: u64,
        len: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no ranking is defined for {0}")]
    UnsupportedRanking(Field),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
