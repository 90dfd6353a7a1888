#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! None of these are fatal. Callers log them and keep the previous or default
//! value.

use std::fmt;

/// A configuration value could not be used as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The font-size rule table is not a JSON array of rules.
    MalformedRuleTable(String),
    /// Every entry of a non-empty rule table was malformed.
    EmptyRuleTable {
        /// Entries dropped while parsing.
        dropped: usize,
    },
    /// A string enum carried a value outside its vocabulary.
    UnknownEnumValue {
        /// Configuration field name.
        field: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRuleTable(msg) => write!(f, "malformed font size rule table: {msg}"),
            Self::EmptyRuleTable { dropped } => {
                write!(f, "font size rule table had no usable entries ({dropped} dropped)")
            }
            Self::UnknownEnumValue { field, value } => {
                write!(f, "unrecognized value {value:?} for {field}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ConfigError::EmptyRuleTable { dropped: 3 }.to_string(),
            "font size rule table had no usable entries (3 dropped)"
        );
        assert_eq!(
            ConfigError::UnknownEnumValue {
                field: "keyboardType",
                value: "bogus".into()
            }
            .to_string(),
            "unrecognized value \"bogus\" for keyboardType"
        );
        assert!(
            ConfigError::MalformedRuleTable("expected array".into())
                .to_string()
                .ends_with("expected array")
        );
    }
}
