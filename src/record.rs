// src/record.rs
use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::schema::{ColumnResolution, Field, DELIMITER};

/// Normalised status of a certified application.
pub const CERTIFIED: &str = "CERTIFIED";

/// ANSI abbreviations for states, DC, territories and freely associated states.
static STATES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AK", "AL", "AR", "AS", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "FM", "GA", "GU", "HI",
        "IA", "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MH", "MI", "MN", "MO", "MP",
        "MS", "MT", "NA", "NC", "ND", "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA",
        "PR", "PW", "RI", "SC", "SD", "TN", "TX", "UM", "UT", "VA", "VI", "VT", "WA", "WI", "WV",
        "WY",
    ]
    .into_iter()
    .collect()
});

/// One cleaned input row. Any field that could not be read or normalised is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub status: Option<String>,
    pub work_state: Option<String>,
    pub soc_code: Option<String>,
    pub soc_name: Option<String>,
}

impl Record {
    /// Split `line` on the delimiter and clean each field, falling back to
    /// alternative columns when the preferred one is missing or invalid.
    pub fn parse(line: &str, columns: &ColumnResolution) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        let entries: Vec<&str> = line.split(DELIMITER).collect();
        Self {
            status: read_field(Field::Status, &entries, columns),
            work_state: read_field(Field::WorkState, &entries, columns),
            soc_code: read_field(Field::SocCode, &entries, columns),
            soc_name: read_field(Field::SocName, &entries, columns),
        }
    }

    pub fn is_certified(&self) -> bool {
        self.status.as_deref() == Some(CERTIFIED)
    }
}

fn read_field(field: Field, entries: &[&str], columns: &ColumnResolution) -> Option<String> {
    columns
        .candidates(field)
        .iter()
        .find_map(|&idx| entries.get(idx).and_then(|raw| clean(field, raw)))
}

/// Normalise one raw value for `field`; `None` when it is empty or invalid.
pub fn clean(field: Field, raw: &str) -> Option<String> {
    let value = match field {
        Field::Status | Field::SocName => Some(raw.to_uppercase()),
        Field::WorkState => clean_state(raw),
        Field::SocCode => clean_soc_code(raw),
    };
    value.filter(|v| !v.is_empty())
}

/// Accepts any casing of a known abbreviation. Full state names are not mapped.
pub fn clean_state(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    STATES.contains(upper.as_str()).then_some(upper)
}

/// Canonical `DD-DDDD` from the first six digits of `raw`, ignoring any
/// separators and trailing digits. Fewer than six digits is invalid.
pub fn clean_soc_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(6).collect();
    if digits.len() < 6 {
        return None;
    }
    Some(format!("{}-{}", &digits[..2], &digits[2..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnResolution {
        ColumnResolution::from_header("CASE_STATUS;WORKSITE_STATE;SOC_CODE;SOC_NAME").unwrap()
    }

    #[test]
    fn test_status_clean() {
        let rec = Record::parse("Certified;AL;15-1131;SOME JOB", &columns());
        assert_eq!(rec.status.as_deref(), Some("CERTIFIED"));
        assert_eq!(rec.work_state.as_deref(), Some("AL"));
        assert_eq!(rec.soc_code.as_deref(), Some("15-1131"));
        assert_eq!(rec.soc_name.as_deref(), Some("SOME JOB"));
        assert!(rec.is_certified());
    }

    #[test]
    fn test_soc_clean() {
        let rec = Record::parse("CERTIFIED;AL;1511-31;SOME JOB", &columns());
        assert_eq!(rec.soc_code.as_deref(), Some("15-1131"));
    }

    #[test]
    fn soc_code_keeps_first_six_digits() {
        assert_eq!(clean_soc_code("15-1131.00").as_deref(), Some("15-1131"));
        assert_eq!(clean_soc_code("15 1131 99").as_deref(), Some("15-1131"));
        assert_eq!(clean_soc_code("\"151131\"").as_deref(), Some("15-1131"));
        assert_eq!(clean_soc_code("15-113"), None);
        assert_eq!(clean_soc_code("SOFTWARE"), None);
        assert_eq!(clean_soc_code(""), None);
    }

    #[test]
    fn test_state_clean() {
        let rec = Record::parse("CERTIFIED;mi;15-1131;SOME JOB", &columns());
        assert_eq!(rec.work_state.as_deref(), Some("MI"));
        assert_eq!(clean_state("pR").as_deref(), Some("PR"));
        assert_eq!(clean_state("Dc").as_deref(), Some("DC"));
    }

    #[test]
    fn test_invalid_state() {
        let rec = Record::parse("CERTIFIED;Michigan;15-1131;SOME JOB", &columns());
        assert_eq!(rec.work_state, None);
        assert_eq!(rec.soc_code.as_deref(), Some("15-1131"));
        assert!(rec.is_certified());
        assert_eq!(clean_state("XX"), None);
        assert_eq!(clean_state(" AL"), None);
    }

    #[test]
    fn test_not_certified() {
        let rec = Record::parse("CERTIFIED-WITHDRAWN;AL;15-1131;SOME JOB", &columns());
        assert!(!rec.is_certified());
    }

    #[test]
    fn fallback_columns_fill_missing_values() {
        let columns = ColumnResolution::from_header(
            "CASE_STATUS;LCA_CASE_WORKLOC1_STATE;LCA_CASE_WORKLOC2_STATE;SOC_CODE;SOC_NAME",
        )
        .unwrap();
        let rec = Record::parse("CERTIFIED;;ny;15-1131;JOB", &columns);
        assert_eq!(rec.work_state.as_deref(), Some("NY"));

        let rec = Record::parse("CERTIFIED;Texas;tx;15-1131;JOB", &columns);
        assert_eq!(rec.work_state.as_deref(), Some("TX"));
    }

    #[test]
    fn short_rows_degrade_to_absent_fields() {
        let rec = Record::parse("CERTIFIED;CA", &columns());
        assert!(rec.is_certified());
        assert_eq!(rec.work_state.as_deref(), Some("CA"));
        assert_eq!(rec.soc_code, None);
        assert_eq!(rec.soc_name, None);

        assert_eq!(Record::parse("", &columns()), Record::default());
    }

    #[test]
    fn crlf_line_endings_are_ignored() {
        let rec = Record::parse("CERTIFIED;AL;15-1131;SOME JOB\r\n", &columns());
        assert_eq!(rec.soc_name.as_deref(), Some("SOME JOB"));
    }
}
