// models/src/util.rs

//! Normalization of raw request values.

/// A list-valued request field as it arrived on the wire: either one
/// comma-delimited string, an explicit sequence (a repeated field), or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListInput {
    Delimited(String),
    Sequence(Vec<String>),
    #[default]
    Absent,
}

impl ListInput {
    /// Resolves the input into its canonical ordered sequence.
    ///
    /// Delimited strings are split on `,` with each element trimmed and empty
    /// elements dropped. Sequences pass through untouched.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ListInput::Delimited(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            ListInput::Sequence(items) => items,
            ListInput::Absent => Vec::new(),
        }
    }
}

impl From<Vec<String>> for ListInput {
    fn from(values: Vec<String>) -> Self {
        match values.len() {
            0 => ListInput::Absent,
            1 => ListInput::Delimited(values.into_iter().next().unwrap_or_default()),
            _ => ListInput::Sequence(values),
        }
    }
}

/// Canonical form of an email address for storage and lookups.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims a scalar field, treating blank input as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
