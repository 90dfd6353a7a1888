#![forbid(unsafe_code)]

//! Word wrapping and grapheme helpers.
//!
//! Wrapping here exists to count lines for height measurement, so it follows
//! what a text view does with a caret in it:
//! - Explicit newlines always start a new line, and a trailing newline yields
//!   an empty last line.
//! - Inter-word whitespace hangs at the end of a line and never forces a wrap.
//! - Words wider than the line break at grapheme boundaries in
//!   [`WrapMode::WordChar`] and overflow their own line in [`WrapMode::Word`].
//!
//! # Example
//! ```
//! use ainput_text::wrap::{wrap_text, WrapMode};
//!
//! let lines = wrap_text("Hello world foo bar", 10, WrapMode::Word);
//! assert_eq!(lines, vec!["Hello", "world foo", "bar"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Cells occupied by a tab.
const TAB_WIDTH: usize = 4;

/// Text wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// No wrapping: the whole text is one line.
    None,
    /// Wrap at word boundaries; long words overflow.
    Word,
    /// Word wrap with grapheme fallback for long words.
    #[default]
    WordChar,
}

/// Wrap `text` into lines no wider than `width` cells.
///
/// A zero width or [`WrapMode::None`] returns the text unchanged as a single
/// line.
#[must_use]
pub fn wrap_text(text: &str, width: usize, mode: WrapMode) -> Vec<String> {
    if width == 0 || mode == WrapMode::None {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for raw_paragraph in text.split('\n') {
        let paragraph = raw_paragraph.strip_suffix('\r').unwrap_or(raw_paragraph);
        wrap_paragraph(paragraph, width, mode == WrapMode::WordChar, &mut lines);
    }
    lines
}

fn wrap_paragraph(text: &str, width: usize, char_fallback: bool, lines: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_width = 0usize;
    let mut pending_ws = String::new();
    let mut pending_ws_width = 0usize;
    let mut at_paragraph_start = true;

    for token in split_words(text) {
        let is_ws = is_whitespace(token);
        // Leading indentation is content; any other whitespace hangs.
        if is_ws && !at_paragraph_start {
            pending_ws.push_str(token);
            pending_ws_width += display_width(token);
            continue;
        }
        at_paragraph_start = false;

        let token_width = display_width(token);
        let sep = if line.is_empty() { 0 } else { pending_ws_width };

        if line_width + sep + token_width <= width {
            if !line.is_empty() {
                line.push_str(&pending_ws);
            }
            line.push_str(token);
            line_width += sep + token_width;
        } else {
            if !line.is_empty() {
                lines.push(finish_line(&line));
                line.clear();
                line_width = 0;
            }
            if token_width > width && char_fallback {
                for grapheme in token.graphemes(true) {
                    let gw = grapheme_width(grapheme);
                    if line_width + gw > width && !line.is_empty() {
                        lines.push(finish_line(&line));
                        line.clear();
                        line_width = 0;
                    }
                    line.push_str(grapheme);
                    line_width += gw;
                }
            } else {
                line.push_str(token);
                line_width = token_width;
            }
        }
        pending_ws.clear();
        pending_ws_width = 0;
    }

    lines.push(finish_line(&line));
}

/// Split into alternating whitespace and non-whitespace runs.
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0usize;
    let mut in_whitespace = None;

    for (idx, grapheme) in text.grapheme_indices(true) {
        let ws = is_whitespace(grapheme);
        if in_whitespace.is_some_and(|prev| prev != ws) {
            words.push(&text[start..idx]);
            start = idx;
        }
        in_whitespace = Some(ws);
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

fn finish_line(line: &str) -> String {
    line.trim_end().to_string()
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Display width of a single grapheme cluster, in cells.
#[inline]
#[must_use]
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    if grapheme.len() == 1 && grapheme.as_bytes()[0].is_ascii_graphic() {
        return 1;
    }
    grapheme.width()
}

/// Display width of text, in cells.
#[must_use]
pub fn display_width(text: &str) -> usize {
    if text.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
        return text.len();
    }
    text.graphemes(true).map(grapheme_width).sum()
}

/// Number of extended grapheme clusters in `text`.
#[inline]
#[must_use]
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of grapheme index `index`, clamped to the end of the text.
#[must_use]
pub fn grapheme_byte_offset(text: &str, index: usize) -> usize {
    text.grapheme_indices(true)
        .nth(index)
        .map_or(text.len(), |(i, _)| i)
}

/// Slice `text` by grapheme indices `[start, end)`, clamping both ends.
#[must_use]
pub fn grapheme_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_start = grapheme_byte_offset(text, start);
    let byte_end = grapheme_byte_offset(text, end.max(start));
    &text[byte_start..byte_end]
}
