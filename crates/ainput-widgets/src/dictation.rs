#![forbid(unsafe_code)]

//! Dictation reconciliation.
//!
//! A dictation source keeps a running transcript and pushes the whole
//! transcript on every update, always appending to its own previous output.
//! The user, meanwhile, may have put the cursor in the middle of the text.
//! Replacing the value with each transcript would move dictated words to the
//! end. Instead a [`DictationSession`] remembers:
//!
//! - `source_baseline`: the transcript the source had produced when the
//!   session (re)started,
//! - `baseline_text`: the committed text at that moment,
//! - `insert_anchor`: the cursor at that moment.
//!
//! Every update is reduced to the suffix the source appended past
//! `source_baseline` and spliced into `baseline_text` at the anchor. Because
//! each update is merged against the same baseline, repeated or growing
//! transcripts converge on the same result.
//!
//! # Example
//! ```
//! use ainput_widgets::dictation::{DictationSession, Reconciled};
//!
//! let session = DictationSession::start("hello world", 5);
//! assert_eq!(
//!     session.reconcile("hello world there"),
//!     Reconciled::Merged { text: "hello there world".into(), cursor: 11 }
//! );
//! ```

use ahash::AHashMap;
use ainput_core::TextRange;
use ainput_text::wrap::{grapheme_byte_offset, grapheme_count};
use unicode_segmentation::UnicodeSegmentation;

/// State of an open dictation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationSession {
    source_baseline: String,
    baseline_text: String,
    insert_anchor: usize,
    last_candidate: String,
}

/// Result of merging a dictation update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The update extended the baseline; the delta was spliced at the anchor.
    Merged {
        /// Text to commit.
        text: String,
        /// Cursor after the dictated delta.
        cursor: usize,
    },
    /// The update did not extend the baseline and must be taken as-is.
    Verbatim,
}

impl DictationSession {
    /// Open a session on the current text and cursor.
    #[must_use]
    pub fn start(text: &str, cursor: usize) -> Self {
        Self {
            source_baseline: text.to_string(),
            baseline_text: text.to_string(),
            insert_anchor: cursor.min(grapheme_count(text)),
            last_candidate: text.to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn baseline_text(&self) -> &str {
        &self.baseline_text
    }

    #[inline]
    #[must_use]
    pub fn source_baseline(&self) -> &str {
        &self.source_baseline
    }

    #[inline]
    #[must_use]
    pub fn insert_anchor(&self) -> usize {
        self.insert_anchor
    }

    /// Last transcript received from the source.
    #[inline]
    #[must_use]
    pub fn last_candidate(&self) -> &str {
        &self.last_candidate
    }

    /// Merge `candidate` into the baseline.
    #[must_use]
    pub fn reconcile(&self, candidate: &str) -> Reconciled {
        let Some(delta) = candidate.strip_prefix(self.source_baseline.as_str()) else {
            return Reconciled::Verbatim;
        };

        let split = grapheme_byte_offset(&self.baseline_text, self.insert_anchor);
        let (before, after) = self.baseline_text.split_at(split);
        let delta = normalize_spacing(before, delta, after);

        let mut text = String::with_capacity(before.len() + delta.len() + after.len());
        text.push_str(before);
        text.push_str(&delta);
        text.push_str(after);

        let cursor = (self.insert_anchor + grapheme_count(&delta)).min(grapheme_count(&text));
        Reconciled::Merged { text, cursor }
    }

    /// Remember the transcript most recently pushed by the source.
    pub fn record_candidate(&mut self, candidate: &str) {
        candidate.clone_into(&mut self.last_candidate);
    }

    /// Restart from the current state after the user touched the text or
    /// cursor. Later transcripts are measured from the last one received.
    pub fn rebase(&mut self, text: &str, cursor: usize) {
        self.source_baseline.clone_from(&self.last_candidate);
        text.clone_into(&mut self.baseline_text);
        self.insert_anchor = cursor.min(grapheme_count(text));
    }

    /// Restart after a transcript that could not be merged, treating it as
    /// both the new source baseline and the committed text. The anchor moves
    /// to the end, where the source appends.
    pub fn rebase_verbatim(&mut self, candidate: &str) {
        self.record_candidate(candidate);
        self.rebase(candidate, usize::MAX);
    }
}

/// Adjust the dictated delta so it joins its neighbours with single spaces.
fn normalize_spacing(before: &str, delta: &str, after: &str) -> String {
    // Start of text behaves like a preceding space.
    let ends_with_ws = before
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace);
    let mut delta = if ends_with_ws {
        delta.trim_start()
    } else {
        delta
    }
    .to_string();

    let joins_word = after
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace() && !is_punctuation(c));
    if !delta.is_empty() && joins_word && !delta.ends_with(char::is_whitespace) {
        delta.push(' ');
    }
    delta
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '…' | '’' | '”' | '»' | '、' | '。' | '，')
}

/// A word located in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    pub word: String,
    /// Grapheme range of the word.
    pub range: TextRange,
}

/// Whitespace-delimited words of `text` with their grapheme ranges.
#[must_use]
pub fn words_with_ranges(text: &str) -> Vec<WordSpan> {
    let mut words = Vec::new();
    let mut current: Option<(usize, usize, usize)> = None; // (grapheme start, byte start, graphemes)

    for (index, (byte, grapheme)) in text.grapheme_indices(true).enumerate() {
        let ws = grapheme.chars().all(char::is_whitespace);
        current = match (current, ws) {
            (None, false) => Some((index, byte, 1)),
            (Some((start, byte_start, len)), false) => Some((start, byte_start, len + 1)),
            (Some((start, byte_start, len)), true) => {
                words.push(WordSpan {
                    word: text[byte_start..byte].to_string(),
                    range: TextRange::new(start, len),
                });
                None
            }
            (None, true) => None,
        };
    }
    if let Some((start, byte_start, len)) = current {
        words.push(WordSpan {
            word: text[byte_start..].to_string(),
            range: TextRange::new(start, len),
        });
    }
    words
}

/// Words of `new` that are not matched by a still-unconsumed word of `old`,
/// in left-to-right order.
///
/// Multiset difference: each old word absorbs one matching occurrence in
/// `new`, scanning left to right, so insertions anywhere in the sequence are
/// detected.
#[must_use]
pub fn new_words(old: &str, new: &str) -> Vec<WordSpan> {
    let mut remaining: AHashMap<&str, usize> = AHashMap::new();
    for word in old.split_whitespace() {
        *remaining.entry(word).or_insert(0) += 1;
    }

    words_with_ranges(new)
        .into_iter()
        .filter(|span| match remaining.get_mut(span.word.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}
