// src/schema/types.rs

use std::fmt;

/// The four semantic fields read from every input file.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Status,
    WorkState,
    SocCode,
    SocName,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Status,
        Field::WorkState,
        Field::SocCode,
        Field::SocName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::WorkState => "work_state",
            Field::SocCode => "soc_code",
            Field::SocName => "soc_name",
        }
    }

    /// How this field's column is located in a header that may come from
    /// any revision of the file layout.
    pub fn rule(&self) -> ColumnRule {
        match self {
            Field::Status => ColumnRule::new(*self, &["CASE_STATUS", "STATUS"], "status"),
            Field::WorkState => ColumnRule::new(
                *self,
                &["WORKSITE_STATE", "LCA_CASE_WORKLOC1_STATE"],
                "work.*state",
            ),
            Field::SocCode => {
                ColumnRule::new(*self, &["SOC_CODE", "LCA_CASE_SOC_CODE"], "soc.*code")
            }
            Field::SocName => {
                ColumnRule::new(*self, &["SOC_NAME", "LCA_CASE_SOC_NAME"], "soc.*name")
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact column names (in priority order) plus a case-insensitive fallback
/// pattern for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRule {
    pub field: Field,
    pub known_names: Vec<String>,
    pub pattern: String,
}

impl ColumnRule {
    pub fn new(field: Field, known_names: &[&str], pattern: &str) -> Self {
        Self {
            field,
            known_names: known_names.iter().map(|s| s.to_string()).collect(),
            pattern: pattern.to_string(),
        }
    }
}
