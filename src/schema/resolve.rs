// src/schema/resolve.rs
use regex::RegexBuilder;
use tracing::debug;

use super::types::{ColumnRule, Field};
use crate::error::{Error, Result};

/// Field separator used by the input files.
pub const DELIMITER: char = ';';

/// Candidate column positions for every [`Field`], built once from a header
/// and shared read-only by all workers.
///
/// Position 0 of each list is the preferred column; the rest are fallbacks
/// tried in order when the preferred column is empty or invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    candidates: [Vec<usize>; 4],
}

impl ColumnResolution {
    /// Resolve every field against a raw header line using the built-in rules.
    pub fn from_header(header: &str) -> Result<Self> {
        let rules = Field::ALL.map(|f| f.rule());
        Self::with_rules(header, &rules)
    }

    /// Resolve against a raw header line with explicit rules. Fields without
    /// a rule in `rules` use their built-in [`Field::rule`]; a field whose
    /// rule matches no column is an error.
    pub fn with_rules(header: &str, rules: &[ColumnRule]) -> Result<Self> {
        let columns: Vec<&str> = header
            .trim_end_matches(['\n', '\r'])
            .split(DELIMITER)
            .collect();

        let mut candidates: [Vec<usize>; 4] = Default::default();
        for field in Field::ALL {
            let rule = rules
                .iter()
                .find(|r| r.field == field)
                .cloned()
                .unwrap_or_else(|| field.rule());
            let found = find_indices(&rule, &columns)?;
            debug!(field = %field, columns = ?found, "resolved column candidates");
            candidates[slot(field)] = found;
        }
        Ok(Self { candidates })
    }

    /// Preferred column for `field`.
    pub fn primary(&self, field: Field) -> usize {
        self.candidates[slot(field)][0]
    }

    /// Fallback columns for `field`, in the order they should be tried.
    pub fn fallbacks(&self, field: Field) -> &[usize] {
        &self.candidates[slot(field)][1..]
    }

    /// Every candidate for `field`, primary first.
    pub fn candidates(&self, field: Field) -> &[usize] {
        &self.candidates[slot(field)]
    }
}

fn slot(field: Field) -> usize {
    match field {
        Field::Status => 0,
        Field::WorkState => 1,
        Field::SocCode => 2,
        Field::SocName => 3,
    }
}

/// Exact names first, in rule priority; then every column matching the
/// pattern, in header order.
fn find_indices(rule: &ColumnRule, columns: &[&str]) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for name in &rule.known_names {
        if let Some(idx) = columns.iter().position(|c| c == name) {
            indices.push(idx);
        }
    }

    let pattern = RegexBuilder::new(&rule.pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            field: rule.field,
            pattern: rule.pattern.clone(),
            source,
        })?;
    indices.extend(
        columns
            .iter()
            .enumerate()
            .filter(|(_, col)| pattern.is_match(col))
            .map(|(idx, _)| idx),
    );

    if indices.is_empty() {
        return Err(Error::MissingColumn {
            field: rule.field,
            known: rule.known_names.clone(),
            pattern: rule.pattern.clone(),
        });
    }
    Ok(indices)
}
