#![forbid(unsafe_code)]

//! Text measurement and sizing policy.
//!
//! # Role in the animated input engine
//! `ainput-text` answers two questions for the value controller:
//!
//! - **How tall is this text?** [`probe::LayoutProbe`] wraps text at a
//!   container width and converts the line count into points.
//! - **What font size fits this length?** [`sizing::font_size_for_length`]
//!   evaluates an ordered [`sizing::FontSizeRules`] table.
//!
//! All lengths and offsets are counted in extended grapheme clusters.

pub mod error;
pub mod probe;
pub mod sizing;
pub mod wrap;

pub use error::ConfigError;
pub use probe::{FontMetrics, FontSpec, LayoutProbe, TextMeasurer};
pub use sizing::{FontSizeRule, FontSizeRules, ParsedRules, font_size_for_length};
pub use wrap::{
    WrapMode, display_width, grapheme_byte_offset, grapheme_count, grapheme_slice, wrap_text,
};
