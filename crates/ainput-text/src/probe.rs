#![forbid(unsafe_code)]

//! Layout probe: how much vertical space does a text need?
//!
//! [`LayoutProbe`] is the default [`TextMeasurer`]. It models the host font
//! as a fixed advance per cell and a fixed line height, both proportional to
//! the font size, and counts wrapped lines with [`crate::wrap::wrap_text`].
//! Hosts with a real glyph engine implement [`TextMeasurer`] themselves.
//!
//! # Invariants
//!
//! 1. `measure` is deterministic for a given probe history: identical inputs
//!    produce identical heights.
//! 2. For a fixed font and width, height is non-decreasing as text is
//!    extended.
//! 3. A container width that is not a positive finite number is replaced by
//!    the last valid width seen, or [`FALLBACK_CONTAINER_WIDTH`] if none.
//! 4. Empty text measures as one line, so an empty control keeps its caret
//!    line.
//!
//! # Caching
//!
//! Results are cached in an LRU keyed by [`MeasureKey`]. Changing the wrap
//! mode through [`TextMeasurer::assert_constraints`] to a different value
//! clears the cache.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;

use crate::wrap::{WrapMode, wrap_text};

/// Width used when no valid container width has ever been seen.
pub const FALLBACK_CONTAINER_WIDTH: f32 = 320.0;

/// Smallest font size the probe will lay out with.
pub const MIN_FONT_SIZE: f32 = 1.0;

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Float noise tolerated before rounding a height up to the next point.
const ROUNDING_SLACK: f32 = 1e-3;

/// Font selection passed to the measurer.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name; `None` selects the host's system font.
    pub family: Option<String>,
    /// Point size.
    pub size: f32,
}

impl FontSpec {
    /// System font at `size` points.
    #[must_use]
    pub fn new(size: f32) -> Self {
        Self { family: None, size }
    }

    /// Set the family name (builder).
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Size clamped to something a layout engine can use.
    #[inline]
    #[must_use]
    pub fn effective_size(&self) -> f32 {
        if self.size.is_finite() {
            self.size.max(MIN_FONT_SIZE)
        } else {
            MIN_FONT_SIZE
        }
    }
}

/// Proportions relating font size to cell advance and line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Advance of one cell as a fraction of the font size.
    pub advance_ratio: f32,
    /// Line height as a multiple of the font size.
    pub line_height_ratio: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            line_height_ratio: 1.2,
        }
    }
}

/// Measures the height a text needs inside a container.
pub trait TextMeasurer {
    /// Height in points of `text` set in `font`, wrapped at
    /// `container_width` with unconstrained height.
    fn measure(&mut self, text: &str, font: &FontSpec, container_width: f32) -> f32;

    /// Re-apply container constraints. Must be idempotent.
    fn assert_constraints(&mut self, container_width: f32, wrap: WrapMode);
}

/// Cache key for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureKey {
    /// FxHash of the text.
    pub text_hash: u64,
    /// Byte length of the text (collision avoidance).
    pub text_len: usize,
    /// FxHash of the family name.
    pub family_hash: u64,
    /// Font size bits.
    pub size_bits: u32,
    /// Container width bits.
    pub width_bits: u32,
}

impl MeasureKey {
    fn new(text: &str, font: &FontSpec, size: f32, width: f32) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        let text_hash = hasher.finish();

        let mut hasher = FxHasher::default();
        font.family.hash(&mut hasher);
        let family_hash = hasher.finish();

        Self {
            text_hash,
            text_len: text.len(),
            family_hash,
            size_bits: size.to_bits(),
            width_bits: width.to_bits(),
        }
    }
}

/// Default measurer backed by cell-based word wrapping.
pub struct LayoutProbe {
    metrics: FontMetrics,
    wrap: WrapMode,
    last_container_width: Option<f32>,
    cache: LruCache<MeasureKey, f32>,
}

impl std::fmt::Debug for LayoutProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutProbe")
            .field("metrics", &self.metrics)
            .field("wrap", &self.wrap)
            .field("last_container_width", &self.last_container_width)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl Default for LayoutProbe {
    fn default() -> Self {
        Self::new(FontMetrics::default())
    }
}

impl LayoutProbe {
    /// Create a probe with the given metrics and word/char wrapping.
    #[must_use]
    pub fn new(metrics: FontMetrics) -> Self {
        Self::with_capacity(metrics, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a probe with a specific cache capacity.
    #[must_use]
    pub fn with_capacity(metrics: FontMetrics, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            metrics,
            wrap: WrapMode::default(),
            last_container_width: None,
            cache: LruCache::new(cap),
        }
    }

    /// Current wrap mode.
    #[inline]
    #[must_use]
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap
    }

    /// Last valid container width seen.
    #[inline]
    #[must_use]
    pub fn last_container_width(&self) -> Option<f32> {
        self.last_container_width
    }

    /// Number of cached measurements.
    #[inline]
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Line height in points for `font`.
    #[must_use]
    pub fn line_height(&self, font: &FontSpec) -> f32 {
        font.effective_size() * self.metrics.line_height_ratio
    }

    /// Number of cells that fit in `width` points.
    #[must_use]
    pub fn columns(&self, font: &FontSpec, width: f32) -> usize {
        let advance = font.effective_size() * self.metrics.advance_ratio;
        let cols = (width / advance).floor();
        if cols.is_finite() && cols >= 1.0 {
            cols as usize
        } else {
            1
        }
    }

    fn effective_width(&mut self, container_width: f32) -> f32 {
        if container_width.is_finite() && container_width > 0.0 {
            self.last_container_width = Some(container_width);
            container_width
        } else {
            self.last_container_width.unwrap_or(FALLBACK_CONTAINER_WIDTH)
        }
    }
}

impl TextMeasurer for LayoutProbe {
    fn measure(&mut self, text: &str, font: &FontSpec, container_width: f32) -> f32 {
        let width = self.effective_width(container_width);
        let size = font.effective_size();
        let key = MeasureKey::new(text, font, size, width);
        if let Some(height) = self.cache.get(&key) {
            return *height;
        }

        let columns = self.columns(font, width);
        let lines = wrap_text(text, columns, self.wrap).len().max(1);
        let height = ceil_points(lines as f32 * self.line_height(font));

        tracing::trace!(
            columns,
            lines,
            height,
            width,
            "probe.measure"
        );

        self.cache.put(key, height);
        height
    }

    fn assert_constraints(&mut self, container_width: f32, wrap: WrapMode) {
        let _ = self.effective_width(container_width);
        if self.wrap != wrap {
            self.wrap = wrap;
            self.cache.clear();
        }
    }
}

/// Round up to whole points, ignoring float noise from the ratio products.
fn ceil_points(raw: f32) -> f32 {
    (raw - ROUNDING_SLACK).ceil().max(0.0)
}
