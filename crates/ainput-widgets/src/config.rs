#![forbid(unsafe_code)]

//! Input configuration.
//!
//! [`InputConfig`] is the full property surface a host bridge can set. It
//! deserializes from camelCase JSON with every field optional, and string
//! enums never fail to parse: unknown values log a warning and fall back to
//! the default variant.
//!
//! Single-property changes go through [`ConfigUpdate`] so the controller can
//! batch the recomputation they trigger.
//!
//! # Example
//! ```
//! use ainput_widgets::config::{InputConfig, KeyboardType};
//!
//! let config = InputConfig::from_json_str(
//!     r#"{"multiline": false, "keyboardType": "email-address", "maxLength": 40}"#,
//! )
//! .unwrap();
//! assert!(!config.multiline);
//! assert_eq!(config.keyboard_type, KeyboardType::EmailAddress);
//! assert_eq!(config.max_length, 40);
//! ```

use std::fmt;
use std::time::Duration;

use ainput_text::{ConfigError, FontSizeRules};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Defines a string-valued configuration enum with lenient parsing.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }

            /// Parse a string form. Matching ignores ASCII case.
            pub fn parse(value: &str) -> Result<Self, ConfigError> {
                let trimmed = value.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($text)
                        $(|| trimmed.eq_ignore_ascii_case($alias))*
                    {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ConfigError::UnknownEnumValue {
                    field: $field,
                    value: value.to_string(),
                })
            }

            /// Parse, falling back to the default variant on unknown input.
            #[must_use]
            pub fn parse_or_default(value: &str) -> Self {
                Self::parse(value).unwrap_or_else(|err| {
                    tracing::warn!(%err, fallback = Self::default().as_str(), "config.enum_fallback");
                    Self::default()
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::parse_or_default(&raw))
            }
        }
    };
}

string_enum! {
    /// Horizontal text alignment.
    Alignment, "alignment" {
        #[default]
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

string_enum! {
    /// Soft keyboard layout requested from the host.
    KeyboardType, "keyboardType" {
        #[default]
        Default => "default",
        EmailAddress => "email-address" | "email",
        Numeric => "numeric",
        PhonePad => "phone-pad",
        NumberPad => "number-pad",
        DecimalPad => "decimal-pad",
        Url => "url",
        AsciiCapable => "ascii-capable",
        WebSearch => "web-search",
    }
}

string_enum! {
    /// Label of the return key.
    ReturnKeyType, "returnKeyType" {
        #[default]
        Default => "default",
        Go => "go",
        Next => "next",
        Search => "search",
        Send => "send",
        Done => "done",
    }
}

string_enum! {
    /// Automatic capitalization mode.
    Autocapitalize, "autocapitalize" {
        None => "none",
        Words => "words",
        #[default]
        Sentences => "sentences",
        Characters => "characters",
    }
}

/// Every property the host can set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    pub alignment: Alignment,
    /// `None` selects the system font.
    pub font_family: Option<String>,
    pub multiline: bool,
    pub auto_grow: bool,
    pub min_height: f32,
    /// `None` means unbounded growth.
    pub max_height: Option<f32>,
    pub keyboard_type: KeyboardType,
    pub return_key_type: ReturnKeyType,
    pub autocapitalize: Autocapitalize,
    pub autocorrect: bool,
    pub secure_entry: bool,
    pub editable: bool,
    /// Maximum length in graphemes. Zero means unlimited.
    pub max_length: usize,
    pub dynamic_sizing: bool,
    pub font_size_rules: FontSizeRules,
    pub base_font_size: f32,
    pub min_font_size: f32,
    pub dictation_active: bool,
    pub animation_duration_ms: u64,
    pub word_stagger_ms: u64,
    /// Text container inset above the first line, in points.
    pub inset_top: f32,
    /// Text container inset below the last line, in points.
    pub inset_bottom: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            font_family: None,
            multiline: true,
            auto_grow: true,
            min_height: 0.0,
            max_height: None,
            keyboard_type: KeyboardType::Default,
            return_key_type: ReturnKeyType::Default,
            autocapitalize: Autocapitalize::Sentences,
            autocorrect: true,
            secure_entry: false,
            editable: true,
            max_length: 0,
            dynamic_sizing: false,
            font_size_rules: FontSizeRules::default(),
            base_font_size: 16.0,
            min_font_size: 14.0,
            dictation_active: false,
            animation_duration_ms: 300,
            word_stagger_ms: 60,
            inset_top: 0.0,
            inset_bottom: 0.0,
        }
    }
}

impl InputConfig {
    /// Parse a whole configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reveal fade duration.
    #[must_use]
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Delay between consecutive word reveals.
    #[must_use]
    pub fn word_stagger(&self) -> Duration {
        Duration::from_millis(self.word_stagger_ms)
    }

    /// Max length, or `None` when unlimited.
    #[must_use]
    pub fn length_limit(&self) -> Option<usize> {
        (self.max_length > 0).then_some(self.max_length)
    }
}

/// A single property change.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Alignment(Alignment),
    FontFamily(Option<String>),
    Multiline(bool),
    AutoGrow(bool),
    MinHeight(f32),
    MaxHeight(Option<f32>),
    KeyboardType(KeyboardType),
    ReturnKeyType(ReturnKeyType),
    Autocapitalize(Autocapitalize),
    Autocorrect(bool),
    SecureEntry(bool),
    Editable(bool),
    MaxLength(usize),
    DynamicSizing(bool),
    FontSizeRules(FontSizeRules),
    /// Serialized rule table; unusable tables keep the previous one.
    FontSizeRulesJson(String),
    BaseFontSize(f32),
    MinFontSize(f32),
    DictationActive(bool),
    AnimationDuration(Duration),
    WordStagger(Duration),
    Insets { top: f32, bottom: f32 },
}

impl ConfigUpdate {
    /// Property name as the host bridge spells it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alignment(_) => "alignment",
            Self::FontFamily(_) => "fontFamily",
            Self::Multiline(_) => "multiline",
            Self::AutoGrow(_) => "autoGrow",
            Self::MinHeight(_) => "minHeight",
            Self::MaxHeight(_) => "maxHeight",
            Self::KeyboardType(_) => "keyboardType",
            Self::ReturnKeyType(_) => "returnKeyType",
            Self::Autocapitalize(_) => "autocapitalize",
            Self::Autocorrect(_) => "autocorrect",
            Self::SecureEntry(_) => "secureEntry",
            Self::Editable(_) => "editable",
            Self::MaxLength(_) => "maxLength",
            Self::DynamicSizing(_) => "dynamicSizing",
            Self::FontSizeRules(_) | Self::FontSizeRulesJson(_) => "fontSizeRules",
            Self::BaseFontSize(_) => "baseFontSize",
            Self::MinFontSize(_) => "minFontSize",
            Self::DictationActive(_) => "dictationActive",
            Self::AnimationDuration(_) => "animationDurationMs",
            Self::WordStagger(_) => "wordStaggerMs",
            Self::Insets { .. } => "insets",
        }
    }
}

/// A finite, non-negative value, or `fallback`.
pub(crate) fn sanitize_points(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}
