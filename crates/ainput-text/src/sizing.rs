#![forbid(unsafe_code)]

//! Length-driven font sizing.
//!
//! A [`FontSizeRules`] table maps text length to font size: the first rule
//! whose `max_length` is at least the length wins. The table is kept sorted
//! ascending by `max_length`; a rule with `max_length == usize::MAX` is
//! unbounded.
//!
//! Tables arrive from the host as JSON:
//!
//! ```
//! use ainput_text::sizing::{FontSizeRules, font_size_for_length};
//!
//! let parsed = FontSizeRules::parse_json(
//!     r#"[{"maxLength": 10, "fontSize": 30}, {"maxLength": null, "fontSize": 12}]"#,
//! )
//! .unwrap();
//! assert_eq!(font_size_for_length(4, &parsed.rules, 10.0), 30.0);
//! assert_eq!(font_size_for_length(400, &parsed.rules, 10.0), 12.0);
//! ```
//!
//! Parsing is lenient per entry: malformed entries are dropped and counted.
//! Only a payload that is not an array, or a non-empty array with nothing
//! usable in it, is an error.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizeRule {
    /// Longest text (in graphemes) this rule applies to.
    pub max_length: usize,
    /// Font size in points.
    pub font_size: f32,
}

impl FontSizeRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(max_length: usize, font_size: f32) -> Self {
        Self {
            max_length,
            font_size,
        }
    }

    /// A rule matching every length.
    #[must_use]
    pub const fn unbounded(font_size: f32) -> Self {
        Self::new(usize::MAX, font_size)
    }

    /// Whether this rule matches every length.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_length == usize::MAX
    }
}

/// Ordered font-size rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSizeRules(Vec<FontSizeRule>);

/// Result of lenient parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRules {
    /// Usable rules, sorted.
    pub rules: FontSizeRules,
    /// Entries dropped as malformed.
    pub dropped: usize,
}

impl Default for FontSizeRules {
    fn default() -> Self {
        Self(vec![
            FontSizeRule::new(20, 32.0),
            FontSizeRule::new(50, 24.0),
            FontSizeRule::new(100, 18.0),
            FontSizeRule::unbounded(14.0),
        ])
    }
}

impl FontSizeRules {
    /// Build a table, sorting rules ascending by `max_length`.
    ///
    /// The sort is stable, so of two rules with the same bound the first one
    /// given wins.
    #[must_use]
    pub fn new(mut rules: Vec<FontSizeRule>) -> Self {
        rules.sort_by_key(|r| r.max_length);
        Self(rules)
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FontSizeRule] {
        &self.0
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a table from JSON text.
    pub fn parse_json(text: &str) -> Result<ParsedRules, ConfigError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| ConfigError::MalformedRuleTable(err.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Parse a table from an already-decoded JSON value.
    pub fn from_json_value(value: &Value) -> Result<ParsedRules, ConfigError> {
        let Value::Array(entries) = value else {
            return Err(ConfigError::MalformedRuleTable(format!(
                "expected an array, got {}",
                json_kind(value)
            )));
        };

        let rules: Vec<FontSizeRule> = entries.iter().filter_map(parse_entry).collect();
        let dropped = entries.len() - rules.len();
        if rules.is_empty() && dropped > 0 {
            return Err(ConfigError::EmptyRuleTable { dropped });
        }
        if dropped > 0 {
            tracing::debug!(dropped, kept = rules.len(), "sizing.rules.dropped_entries");
        }

        Ok(ParsedRules {
            rules: Self::new(rules),
            dropped,
        })
    }
}

fn parse_entry(entry: &Value) -> Option<FontSizeRule> {
    let obj = entry.as_object()?;
    let max_length = match obj.get("maxLength").or_else(|| obj.get("max_length")) {
        Some(Value::Null) => usize::MAX,
        Some(v) => usize::try_from(v.as_u64()?).ok()?,
        None => return None,
    };
    let font_size = obj
        .get("fontSize")
        .or_else(|| obj.get("font_size"))?
        .as_f64()? as f32;
    if !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }
    Some(FontSizeRule::new(max_length, font_size))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleRepr {
    max_length: Option<usize>,
    font_size: f32,
}

impl Serialize for FontSizeRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|r| RuleRepr {
            max_length: (!r.is_unbounded()).then_some(r.max_length),
            font_size: r.font_size,
        }))
    }
}

impl<'de> Deserialize<'de> for FontSizeRules {
    /// Never fails on content: an unusable table falls back to the default.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match Self::from_json_value(&value) {
            Ok(parsed) => Ok(parsed.rules),
            Err(err) => {
                tracing::warn!(%err, "sizing.rules.fallback_default");
                Ok(Self::default())
            }
        }
    }
}

/// Font size for a text of `length` graphemes.
///
/// Returns the first rule's size with `length <= max_length`, or `floor`
/// when no rule matches.
#[must_use]
pub fn font_size_for_length(length: usize, rules: &FontSizeRules, floor: f32) -> f32 {
    rules
        .rules()
        .iter()
        .find(|rule| length <= rule.max_length)
        .map_or(floor, |rule| rule.font_size)
}
