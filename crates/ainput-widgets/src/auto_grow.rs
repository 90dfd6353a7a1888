#![forbid(unsafe_code)]

//! Auto-grow height tracking.
//!
//! The tracker turns a measured text height into the height the control
//! should have, and decides whether the host needs to hear about it.
//!
//! Each [`AutoGrowTracker::update`] runs `Idle -> Measuring -> Reporting ->
//! Idle` in one call:
//!
//! 1. **Measuring**: ask the measurer for the text height at the container
//!    width, add the vertical insets, clamp to `[min, max]`.
//! 2. **Reporting**: if the clamped height moved more than
//!    [`HEIGHT_EPSILON`] from the last reported height, return it as a new
//!    content size.
//!
//! Identical inputs give identical decisions, so repeated updates never
//! report twice.

use ainput_core::Size;
use ainput_text::{FontSpec, TextMeasurer};

use crate::config::sanitize_points;

/// Height changes at or below this many points are not reported.
pub const HEIGHT_EPSILON: f32 = 0.5;

/// Where the tracker is in its update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowPhase {
    #[default]
    Idle,
    Measuring,
    Reporting,
}

/// Height bounds and insets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightConstraints {
    pub min_height: f32,
    /// `None` means unbounded.
    pub max_height: Option<f32>,
    pub inset_top: f32,
    pub inset_bottom: f32,
}

impl Default for HeightConstraints {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: None,
            inset_top: 0.0,
            inset_bottom: 0.0,
        }
    }
}

impl HeightConstraints {
    /// Normalize: negative or non-finite values become 0, and a max below
    /// the min is raised to the min.
    #[must_use]
    pub fn normalized(self) -> Self {
        let min_height = sanitize_points(self.min_height, 0.0);
        let max_height = self
            .max_height
            .filter(|m| m.is_finite())
            .map(|m| m.max(min_height));
        Self {
            min_height,
            max_height,
            inset_top: sanitize_points(self.inset_top, 0.0),
            inset_bottom: sanitize_points(self.inset_bottom, 0.0),
        }
    }

    /// Clamp a content height into bounds.
    #[must_use]
    pub fn clamp(&self, height: f32) -> f32 {
        let floored = height.max(self.min_height);
        self.max_height.map_or(floored, |max| floored.min(max))
    }
}

/// Decides the control height and when to tell the host.
#[derive(Debug, Clone)]
pub struct AutoGrowTracker {
    enabled: bool,
    constraints: HeightConstraints,
    phase: GrowPhase,
    last_reported: Option<f32>,
    last_content_height: f32,
    scroll_enabled: bool,
}

impl Default for AutoGrowTracker {
    fn default() -> Self {
        Self::new(true, HeightConstraints::default())
    }
}

impl AutoGrowTracker {
    /// Create a tracker.
    #[must_use]
    pub fn new(enabled: bool, constraints: HeightConstraints) -> Self {
        Self {
            enabled,
            constraints: constraints.normalized(),
            phase: GrowPhase::Idle,
            last_reported: None,
            last_content_height: 0.0,
            scroll_enabled: !enabled,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub fn constraints(&self) -> HeightConstraints {
        self.constraints
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GrowPhase {
        self.phase
    }

    /// Last height reported to the host.
    #[inline]
    #[must_use]
    pub fn last_reported(&self) -> Option<f32> {
        self.last_reported
    }

    /// Unclamped height of the last measurement, insets included.
    #[inline]
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.last_content_height
    }

    /// Whether the control should scroll internally.
    #[inline]
    #[must_use]
    pub fn scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    /// Turn growth on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.scroll_enabled = true;
        }
    }

    /// Replace the bounds.
    pub fn set_constraints(&mut self, constraints: HeightConstraints) {
        self.constraints = constraints.normalized();
    }

    /// Re-measure and return a new content size if the host must be told.
    pub fn update(
        &mut self,
        measurer: &mut dyn TextMeasurer,
        text: &str,
        font: &FontSpec,
        container_width: f32,
    ) -> Option<Size> {
        self.transition(GrowPhase::Measuring);
        let measured = measurer.measure(text, font, container_width);
        let content = measured + self.constraints.inset_top + self.constraints.inset_bottom;
        self.last_content_height = content;

        if !self.enabled {
            self.scroll_enabled = true;
            self.transition(GrowPhase::Idle);
            return None;
        }

        let target = self.constraints.clamp(content);
        self.scroll_enabled = self.constraints.max_height.is_some_and(|max| content > max);

        self.transition(GrowPhase::Reporting);
        let changed = self
            .last_reported
            .is_none_or(|last| (target - last).abs() > HEIGHT_EPSILON);
        let report = changed.then(|| {
            self.last_reported = Some(target);
            Size::new(container_width.max(0.0), target)
        });
        self.transition(GrowPhase::Idle);
        report
    }

    /// Forget the last report so the next update reports unconditionally.
    pub fn invalidate(&mut self) {
        self.last_reported = None;
    }

    fn transition(&mut self, next: GrowPhase) {
        tracing::trace!(from = ?self.phase, to = ?next, "auto_grow.phase");
        self.phase = next;
    }
}
