#![forbid(unsafe_code)]

//! Geometric primitives.

/// A size in host points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A range of grapheme clusters: `start` plus `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TextRange {
    /// First grapheme index (inclusive).
    pub start: usize,
    /// Number of graphemes.
    pub len: usize,
}

impl TextRange {
    /// Create a new range.
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// A collapsed range at `pos`.
    #[inline]
    pub const fn caret(pos: usize) -> Self {
        Self::new(pos, 0)
    }

    /// End index (exclusive). Saturates instead of overflowing.
    #[inline]
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    /// Whether the range is collapsed.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the range lies inside a text of `text_len` graphemes.
    #[inline]
    pub const fn fits_within(&self, text_len: usize) -> bool {
        self.start <= text_len && self.len <= text_len - self.start
    }

    /// Whether `index` falls inside the range.
    #[inline]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    /// Whether two ranges share at least one grapheme. Empty ranges never
    /// overlap anything.
    #[inline]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end()
            && other.start < self.end()
    }
}
