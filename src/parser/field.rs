use serde::{Deserialize, Serialize};
use std::fmt;

use super::tokenizer::{tokenize, LabelSet};

/// One labelled value recovered from a change-log string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub label: String,
    pub value: String,
}

impl FieldEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Split a `LABEL: value` string at its first `:`. One space of padding
    /// after the `:` belongs to the separator, not the value.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((label, rest)) => Self {
                label: label.trim().to_string(),
                value: rest.strip_prefix(' ').unwrap_or(rest).to_string(),
            },
            None => Self {
                label: text.trim().to_string(),
                value: String::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl fmt::Display for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}:", self.label)
        } else {
            write!(f, "{}: {}", self.label, self.value)
        }
    }
}

/// Tokenize a raw string and parse each field into a [`FieldEntry`]
pub fn parse_fields(raw: &str, labels: &LabelSet) -> Vec<FieldEntry> {
    tokenize(raw, labels)
        .iter()
        .map(|text| FieldEntry::parse(text))
        .collect()
}
