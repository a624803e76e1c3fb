// src/summary/mod.rs
pub mod write;

use std::cmp::Reverse;

use crate::error::{Error, Result};
use crate::process::{Aggregate, NameTally};
use crate::schema::Field;
use crate::tally::Tally;

pub use write::write_results;

/// Number of entries kept in a ranking.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub label: String,
    pub count: u64,
}

/// Up to [`TOP_N`] entries, highest count first, plus the total count
/// used as the percentage denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedResult {
    /// First column of the output header, e.g. `TOP_STATES`.
    pub title: &'static str,
    pub entries: Vec<RankedEntry>,
    pub total: u64,
}

impl RankedResult {
    /// Share of `total` for `count`, in percent.
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Rank the states (`Field::WorkState`) or occupations (`Field::SocName`)
/// of an aggregate.
///
/// Every key tied with the tenth-highest count is considered before the
/// final sort, so which tied key makes the cut depends only on its label:
/// count descending, then label ascending, then truncation to [`TOP_N`].
pub fn select(agg: &Aggregate, field: Field) -> Result<RankedResult> {
    let (title, counter) = match field {
        Field::WorkState => ("TOP_STATES", &agg.states),
        Field::SocName => ("TOP_OCCUPATIONS", &agg.soc_codes),
        other => return Err(Error::UnsupportedRanking(other)),
    };
    let total = counter.total();

    let mut entries: Vec<RankedEntry> = top_with_ties(counter, TOP_N)
        .into_iter()
        .map(|(key, count)| {
            let label = match field {
                Field::SocName => display_name(key, agg.soc_names.get(&key.to_string())),
                _ => key.to_string(),
            };
            RankedEntry { label, count }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.label.cmp(&b.label))
    });
    entries.truncate(TOP_N);

    Ok(RankedResult {
        title,
        entries,
        total,
    })
}

/// Every key whose count is at least the `n`-th highest count.
///
/// This can return more than `n` keys when several share the cutoff count.
fn top_with_ties(counter: &Tally<String, u64>, n: usize) -> Vec<(&str, u64)> {
    if counter.is_empty() || n == 0 {
        return Vec::new();
    }
    let mut counts: Vec<u64> = counter.iter().map(|(_, &c)| c).collect();
    counts.sort_unstable_by_key(|&c| Reverse(c));
    let cutoff = counts[n.min(counts.len()) - 1];

    counter
        .iter()
        .filter(|&(_, &count)| count >= cutoff)
        .map(|(key, &count)| (key.as_str(), count))
        .collect()
}

/// Most frequent known name for a SOC code, with surrounding quotes removed.
///
/// Ties go to the lexicographically smallest name. Records without a name
/// never beat a known one; a code with no known name is labelled by itself.
fn display_name(code: &str, names: Option<&NameTally>) -> String {
    names
        .and_then(|names| {
            names
                .iter()
                .filter_map(|(name, &count)| name.as_deref().map(|n| (n, count)))
                .min_by(|(a_name, a_count), (b_name, b_count)| {
                    b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
                })
        })
        .map(|(name, _)| name.trim_matches('"').to_string())
        .unwrap_or_else(|| code.to_string())
}
