#![forbid(unsafe_code)]

//! Value controller: the single owner of the text value and cursor.
//!
//! Every writer goes through one of the controller's mutation methods:
//!
//! - keystrokes: [`ValueController::submit_user_edit`]
//! - programmatic pushes: [`ValueController::set_value`]
//! - dictation toggles: [`ValueController::set_dictation_active`]
//! - property changes: [`ValueController::apply_config`]
//!
//! Each method commits at most once and then runs the dependent work in a
//! fixed order (font size, then constraints, then height, then settle
//! scheduling) before returning. Notifications for the host pile up in an
//! outbox drained with [`ValueController::take_notifications`].
//!
//! Deferred work (reveal start/complete, layout settle) runs on a virtual
//! clock moved by [`ValueController::advance`].
//!
//! # Invariants
//!
//! 1. `cursor() <= grapheme_count(value())` after every public call.
//! 2. Hidden ranges are exactly the ranges of live reveal tasks.
//! 3. A reveal task never outlives the value it was created for: any commit
//!    while tasks are live force-completes them first.
//! 4. Committing the current value is a no-op: no notifications, no tasks.
//!
//! # Example
//! ```
//! use ainput_widgets::{InputConfig, ValueController};
//! use ainput_core::{Notification, TextRange};
//!
//! let mut input = ValueController::new(InputConfig::default());
//! input.take_notifications();
//!
//! assert!(input.submit_user_edit("hi", TextRange::caret(0), "hi"));
//! assert_eq!(input.value(), "hi");
//! assert_eq!(input.cursor(), 2);
//! assert!(matches!(
//!     input.take_notifications().first(),
//!     Some(Notification::TextChanged { text }) if text == "hi"
//! ));
//! ```

use std::time::Duration;

use ainput_core::animation::stagger_offsets;
use ainput_core::{DeferredQueue, Notification, TextRange};
use ainput_text::wrap::{grapheme_byte_offset, grapheme_count};
use ainput_text::{
    FontSizeRules, FontSpec, LayoutProbe, TextMeasurer, WrapMode, font_size_for_length,
};
use bitflags::bitflags;

use crate::auto_grow::{AutoGrowTracker, HeightConstraints};
use crate::config::{ConfigUpdate, InputConfig};
use crate::dictation::{DictationSession, Reconciled, new_words};
use crate::error::{EditRejection, Error};
use crate::reveal::{AnimationTask, RevealOverlay, RevealRegistry, TaskId};

/// Delays of the layout re-assertions scheduled after focus and font changes.
pub const SETTLE_DELAYS: [Duration; 3] = [
    Duration::from_millis(16),
    Duration::from_millis(100),
    Duration::from_millis(250),
];

/// Glyph substituted for every grapheme when measuring secure entry.
const MASK_GLYPH: char = '\u{2022}';

bitflags! {
    /// Work owed after a mutation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Recompute: u8 {
        const FONT        = 1 << 0;
        const CONSTRAINTS = 1 << 1;
        const HEIGHT      = 1 << 2;
        const SETTLE      = 1 << 3;
    }
}

/// Deferred jobs on the controller's virtual clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    RevealStart(TaskId),
    RevealComplete(TaskId),
    Settle,
}

impl Job {
    fn is_reveal(&self) -> bool {
        matches!(self, Self::RevealStart(_) | Self::RevealComplete(_))
    }
}

/// Owns the text value, cursor, and everything derived from them.
#[derive(Debug)]
pub struct ValueController<M: TextMeasurer = LayoutProbe> {
    config: InputConfig,
    text: String,
    cursor: usize,
    focused: bool,
    container_width: f32,
    font_size: f32,
    session: Option<DictationSession>,
    reveal: RevealRegistry,
    grow: AutoGrowTracker,
    measurer: M,
    queue: DeferredQueue<Job>,
    outbox: Vec<Notification>,
}

impl Default for ValueController<LayoutProbe> {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl ValueController<LayoutProbe> {
    /// Create a controller measuring with the default [`LayoutProbe`].
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self::with_measurer(config, LayoutProbe::default())
    }
}

impl<M: TextMeasurer> ValueController<M> {
    /// Create a controller with a host-supplied measurer.
    ///
    /// The initial content size is queued as a notification.
    pub fn with_measurer(config: InputConfig, measurer: M) -> Self {
        let mut this = Self {
            text: String::new(),
            cursor: 0,
            focused: false,
            container_width: 0.0,
            font_size: config.base_font_size,
            session: None,
            reveal: RevealRegistry::new(config.animation_duration()),
            grow: AutoGrowTracker::new(config.auto_grow, constraints_of(&config)),
            measurer,
            queue: DeferredQueue::new(),
            outbox: Vec::new(),
            config,
        };
        this.font_size = this.target_font_size();
        if this.config.dictation_active {
            this.session = Some(DictationSession::start("", 0));
        }
        this.recompute(Recompute::CONSTRAINTS | Recompute::HEIGHT);
        this
    }

    // --- Accessors ---------------------------------------------------------

    /// Committed text.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Cursor offset in graphemes.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the control holds input focus.
    #[inline]
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Font size currently applied.
    #[inline]
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Configuration currently in effect.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The measurer used for height decisions.
    #[inline]
    #[must_use]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Container width in points, as last set by the host.
    #[inline]
    #[must_use]
    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    /// Whether a dictation session is open.
    #[inline]
    #[must_use]
    pub fn is_dictation_active(&self) -> bool {
        self.session.is_some()
    }

    /// The open dictation session, if any.
    #[inline]
    #[must_use]
    pub fn dictation_session(&self) -> Option<&DictationSession> {
        self.session.as_ref()
    }

    /// Live reveal tasks, oldest first.
    #[inline]
    #[must_use]
    pub fn reveal_tasks(&self) -> &[AnimationTask] {
        self.reveal.tasks()
    }

    /// Ranges of the committed text that are currently invisible.
    #[must_use]
    pub fn hidden_ranges(&self) -> Vec<TextRange> {
        self.reveal.hidden_ranges()
    }

    /// Overlays the host should draw now.
    #[must_use]
    pub fn reveal_overlays(&self) -> Vec<RevealOverlay> {
        self.reveal.overlays(self.queue.now())
    }

    /// Whether the control should scroll internally.
    #[inline]
    #[must_use]
    pub fn scroll_enabled(&self) -> bool {
        self.grow.scroll_enabled()
    }

    /// Last height reported to the host.
    #[inline]
    #[must_use]
    pub fn content_height(&self) -> Option<f32> {
        self.grow.last_reported()
    }

    /// Current virtual time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    /// Number of deferred jobs waiting on the clock.
    #[inline]
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Notifications queued since the last drain.
    #[inline]
    #[must_use]
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.outbox
    }

    /// Drain queued notifications in emission order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    // --- Edits -------------------------------------------------------------

    /// Apply a keystroke. Returns `false` when the host should discard it.
    ///
    /// `proposed` is the text as the host surface would read after the
    /// keystroke; the controller derives its own result from `range` and
    /// `replacement` and only logs a disagreement.
    pub fn submit_user_edit(&mut self, proposed: &str, range: TextRange, replacement: &str) -> bool {
        match self.try_submit_user_edit(proposed, range, replacement) {
            Ok(()) => true,
            Err(rejection) => {
                let err = Error::from(rejection);
                tracing::debug!(
                    error = %err,
                    recovery = ?err.recovery(),
                    "edit.rejected"
                );
                false
            }
        }
    }

    /// [`submit_user_edit`](Self::submit_user_edit) with the reason for a
    /// rejection.
    pub fn try_submit_user_edit(
        &mut self,
        proposed: &str,
        range: TextRange,
        replacement: &str,
    ) -> Result<(), EditRejection> {
        if !self.config.editable {
            return Err(EditRejection::NotEditable);
        }

        let text_len = grapheme_count(&self.text);
        if !range.fits_within(text_len) {
            return Err(EditRejection::RangeOutOfBounds {
                start: range.start,
                len: range.len,
                text_len,
            });
        }

        if !self.config.multiline && is_return(replacement) {
            self.outbox.push(Notification::Submit {
                text: self.text.clone(),
            });
            return Err(EditRejection::SubmitInstead);
        }

        let start = grapheme_byte_offset(&self.text, range.start);
        let end = grapheme_byte_offset(&self.text, range.end());
        let mut next = String::with_capacity(self.text.len() - (end - start) + replacement.len());
        next.push_str(&self.text[..start]);
        next.push_str(replacement);
        next.push_str(&self.text[end..]);

        if let Some(max) = self.config.length_limit() {
            let resulting = grapheme_count(&next);
            // Edits that shrink an already over-long text stay allowed.
            if resulting > max && resulting > text_len {
                return Err(EditRejection::MaxLengthExceeded { max, resulting });
            }
        }

        if next != proposed {
            tracing::debug!(
                proposed_len = proposed.len(),
                derived_len = next.len(),
                "edit.proposed_mismatch"
            );
        }

        if self.session.is_some() {
            self.outbox.push(Notification::DictationTap);
        }
        self.cancel_reveals("user_edit");
        let cursor = range.start + grapheme_count(replacement);
        self.commit(next, cursor, "user_edit");
        if let Some(session) = self.session.as_mut() {
            session.rebase(&self.text, self.cursor);
        }
        Ok(())
    }

    /// Replace the value programmatically.
    ///
    /// While dictation is active the value is treated as a transcript and
    /// merged at the session anchor; newly appearing words get reveal tasks.
    pub fn set_value(&mut self, text: impl Into<String>) {
        let candidate = text.into();
        if candidate == self.text {
            tracing::trace!("set_value.unchanged");
            return;
        }
        let Some(session) = self.session.as_ref() else {
            self.cancel_reveals("superseded");
            let cursor = self.unsessioned_cursor(&candidate);
            self.commit(candidate, cursor, "set_value");
            return;
        };

        let baseline_len = grapheme_count(session.source_baseline());
        let reconciled = session.reconcile(&candidate);
        // A resent transcript that merges to the committed text leaves reveals running.
        if matches!(&reconciled, Reconciled::Merged { text, .. } if *text == self.text) {
            if let Some(session) = self.session.as_mut() {
                session.record_candidate(&candidate);
            }
            tracing::trace!("set_value.merge_unchanged");
            return;
        }
        self.cancel_reveals("superseded");

        let previous = self.text.clone();
        match reconciled {
            Reconciled::Merged { text, cursor } => {
                if let Some(session) = self.session.as_mut() {
                    session.record_candidate(&candidate);
                }
                self.commit(text, cursor, "dictation_merge");
            }
            Reconciled::Verbatim => {
                let err = Error::ReconcileMismatch { baseline_len };
                tracing::debug!(error = %err, recovery = ?err.recovery(), "dictation.mismatch");
                let cursor = self.unsessioned_cursor(&candidate);
                self.commit(candidate.clone(), cursor, "dictation_verbatim");
                if let Some(session) = self.session.as_mut() {
                    session.rebase_verbatim(&candidate);
                }
            }
        }
        self.spawn_reveals(&previous);
    }

    /// Open or close a dictation session.
    ///
    /// Closing, or repeating the current state, force-completes every reveal.
    pub fn set_dictation_active(&mut self, active: bool) {
        match (self.session.is_some(), active) {
            (false, true) => {
                self.cancel_reveals("session_start");
                self.session = Some(DictationSession::start(&self.text, self.cursor));
            }
            (true, false) => {
                self.cancel_reveals("session_end");
                self.session = None;
            }
            _ => self.cancel_reveals("session_repeat"),
        }
        self.config.dictation_active = active;
        self.trace_edit("set_dictation_active");
    }

    /// Move the cursor. During dictation this counts as a user interaction.
    pub fn set_selection(&mut self, position: usize) {
        self.cursor = position.min(grapheme_count(&self.text));
        if let Some(session) = self.session.as_mut() {
            session.rebase(&self.text, self.cursor);
            self.outbox.push(Notification::DictationTap);
        }
        self.trace_edit("set_selection");
    }

    /// The user tapped the control.
    pub fn tap(&mut self) {
        if self.session.is_some() {
            self.outbox.push(Notification::DictationTap);
        }
    }

    // --- Focus and layout --------------------------------------------------

    /// Take input focus. No-op when already focused.
    pub fn focus(&mut self) {
        if self.focused {
            return;
        }
        self.focused = true;
        self.outbox.push(Notification::FocusGained);
        self.recompute(Recompute::SETTLE);
    }

    /// Give up input focus. No-op when not focused.
    pub fn blur(&mut self) {
        if !self.focused {
            return;
        }
        self.focused = false;
        self.outbox.push(Notification::FocusLost);
        self.recompute(Recompute::SETTLE);
    }

    /// The host laid the control out at a new width.
    pub fn set_container_width(&mut self, width: f32) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        if width == self.container_width {
            return;
        }
        self.container_width = width;
        self.recompute(Recompute::CONSTRAINTS);
    }

    // --- Configuration -----------------------------------------------------

    /// Apply one property change.
    pub fn apply_config(&mut self, update: ConfigUpdate) {
        self.apply_configs(std::iter::once(update));
    }

    /// Apply several property changes with a single recompute pass.
    pub fn apply_configs(&mut self, updates: impl IntoIterator<Item = ConfigUpdate>) {
        let mut dirty = Recompute::empty();
        for update in updates {
            dirty |= self.stage_config(update);
        }
        self.recompute(dirty);
    }

    /// Replace the whole configuration.
    pub fn replace_config(&mut self, config: InputConfig) {
        let dictation = config.dictation_active;
        self.config = config;
        self.grow.set_enabled(self.config.auto_grow);
        self.grow.set_constraints(constraints_of(&self.config));
        self.reveal.set_duration(self.config.animation_duration());
        if dictation != self.session.is_some() {
            self.set_dictation_active(dictation);
        }
        self.recompute(Recompute::all());
    }

    fn stage_config(&mut self, update: ConfigUpdate) -> Recompute {
        tracing::trace!(property = update.name(), "config.update");
        let config = &mut self.config;
        match update {
            ConfigUpdate::Alignment(v) => config.alignment = v,
            ConfigUpdate::KeyboardType(v) => config.keyboard_type = v,
            ConfigUpdate::ReturnKeyType(v) => config.return_key_type = v,
            ConfigUpdate::Autocapitalize(v) => config.autocapitalize = v,
            ConfigUpdate::Autocorrect(v) => config.autocorrect = v,
            ConfigUpdate::Editable(v) => config.editable = v,
            ConfigUpdate::MaxLength(v) => config.max_length = v,
            ConfigUpdate::FontFamily(family) => {
                config.font_family = family;
                return Recompute::HEIGHT | Recompute::SETTLE;
            }
            ConfigUpdate::Multiline(v) => {
                config.multiline = v;
                return Recompute::CONSTRAINTS;
            }
            ConfigUpdate::SecureEntry(v) => {
                config.secure_entry = v;
                return Recompute::HEIGHT;
            }
            ConfigUpdate::AutoGrow(v) => {
                config.auto_grow = v;
                self.grow.set_enabled(v);
                return Recompute::HEIGHT;
            }
            ConfigUpdate::MinHeight(v) => {
                config.min_height = v;
                self.grow.set_constraints(constraints_of(config));
                return Recompute::HEIGHT;
            }
            ConfigUpdate::MaxHeight(v) => {
                config.max_height = v;
                self.grow.set_constraints(constraints_of(config));
                return Recompute::HEIGHT;
            }
            ConfigUpdate::Insets { top, bottom } => {
                config.inset_top = top;
                config.inset_bottom = bottom;
                self.grow.set_constraints(constraints_of(config));
                return Recompute::HEIGHT;
            }
            ConfigUpdate::DynamicSizing(v) => {
                config.dynamic_sizing = v;
                return Recompute::FONT | Recompute::SETTLE;
            }
            ConfigUpdate::BaseFontSize(v) => {
                config.base_font_size = v;
                return Recompute::FONT | Recompute::SETTLE;
            }
            ConfigUpdate::MinFontSize(v) => {
                config.min_font_size = v;
                return Recompute::FONT | Recompute::SETTLE;
            }
            ConfigUpdate::FontSizeRules(rules) => {
                config.font_size_rules = rules;
                return Recompute::FONT | Recompute::SETTLE;
            }
            ConfigUpdate::FontSizeRulesJson(json) => {
                return match FontSizeRules::parse_json(&json) {
                    Ok(parsed) => {
                        config.font_size_rules = parsed.rules;
                        Recompute::FONT | Recompute::SETTLE
                    }
                    Err(err) => {
                        let err = Error::from(err);
                        tracing::warn!(
                            error = %err,
                            recovery = ?err.recovery(),
                            "config.rules_rejected"
                        );
                        Recompute::empty()
                    }
                };
            }
            ConfigUpdate::AnimationDuration(d) => {
                config.animation_duration_ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                self.reveal.set_duration(d);
            }
            ConfigUpdate::WordStagger(d) => {
                config.word_stagger_ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
            }
            ConfigUpdate::DictationActive(v) => self.set_dictation_active(v),
        }
        Recompute::empty()
    }

    // --- Clock -------------------------------------------------------------

    /// Advance the virtual clock by `dt`, running every job that falls due.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.queue.now().saturating_add(dt);
        while let Some((due, job)) = self.queue.pop_due(target) {
            self.run_job(due, job);
        }
        self.queue.advance_to(target);
    }

    /// Run every pending job regardless of due time.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.queue.next_due() {
            let dt = due.saturating_sub(self.queue.now());
            self.advance(dt);
        }
    }

    fn run_job(&mut self, due: Duration, job: Job) {
        match job {
            Job::RevealStart(id) => match self.reveal.begin(id, due) {
                Some(fade) => {
                    tracing::trace!(task = id.get(), "reveal.start");
                    self.queue.schedule_after(fade, Job::RevealComplete(id));
                }
                None => drop_stale(id),
            },
            Job::RevealComplete(id) => match self.reveal.complete(id) {
                Some(task) => tracing::trace!(task = id.get(), word = task.word(), "reveal.complete"),
                None => drop_stale(id),
            },
            Job::Settle => {
                tracing::trace!(now_ms = due.as_millis() as u64, "layout.settle");
                self.measurer
                    .assert_constraints(self.container_width, self.wrap_mode());
                self.update_height();
            }
        }
    }

    /// Finish all animations and drop all deferred work.
    pub fn teardown(&mut self) {
        self.cancel_reveals("teardown");
        self.queue.clear();
        self.session = None;
    }

    // --- Internals ---------------------------------------------------------

    /// The single commit path. Returns whether the text changed.
    fn commit(&mut self, text: String, cursor: usize, operation: &'static str) -> bool {
        let changed = text != self.text;
        if changed {
            self.text = text;
        }
        self.cursor = cursor.min(grapheme_count(&self.text));
        self.trace_edit(operation);
        if !changed {
            return false;
        }
        self.outbox.push(Notification::TextChanged {
            text: self.text.clone(),
        });
        self.recompute(Recompute::FONT | Recompute::HEIGHT);
        true
    }

    fn recompute(&mut self, mut dirty: Recompute) {
        if dirty.contains(Recompute::FONT) {
            let size = self.target_font_size();
            if size != self.font_size {
                tracing::debug!(from = self.font_size, to = size, "font.resize");
                self.font_size = size;
                dirty |= Recompute::HEIGHT | Recompute::SETTLE;
            }
        }
        if dirty.contains(Recompute::CONSTRAINTS) {
            self.measurer
                .assert_constraints(self.container_width, self.wrap_mode());
            dirty |= Recompute::HEIGHT;
        }
        if dirty.contains(Recompute::HEIGHT) {
            self.update_height();
        }
        if dirty.contains(Recompute::SETTLE) {
            self.schedule_settle();
        }
    }

    fn update_height(&mut self) {
        let font = self.font_spec();
        let masked;
        let text = if self.config.secure_entry {
            masked = mask(&self.text);
            masked.as_str()
        } else {
            self.text.as_str()
        };
        if let Some(size) = self
            .grow
            .update(&mut self.measurer, text, &font, self.container_width)
        {
            self.outbox.push(Notification::ContentSizeChanged(size));
        }
    }

    fn schedule_settle(&mut self) {
        self.queue.retain(|job| *job != Job::Settle);
        for delay in SETTLE_DELAYS {
            self.queue.schedule_after(delay, Job::Settle);
        }
    }

    fn spawn_reveals(&mut self, previous: &str) {
        let words = new_words(previous, &self.text);
        if words.is_empty() {
            return;
        }
        let offsets = stagger_offsets(words.len(), self.config.word_stagger());
        let count = words.len();
        for (span, delay) in words.into_iter().zip(offsets) {
            let id = self.reveal.spawn(span.word, span.range, delay);
            self.queue.schedule_after(delay, Job::RevealStart(id));
        }
        tracing::debug!(count, "reveal.spawned");
    }

    fn cancel_reveals(&mut self, reason: &'static str) {
        let cancelled = self.reveal.force_complete_all();
        if cancelled > 0 {
            self.queue.retain(|job| !job.is_reveal());
            tracing::debug!(cancelled, reason, "reveal.force_complete");
        }
    }

    fn unsessioned_cursor(&self, candidate: &str) -> usize {
        let len = grapheme_count(candidate);
        if self.focused { len } else { self.cursor.min(len) }
    }

    fn target_font_size(&self) -> f32 {
        if self.config.dynamic_sizing {
            font_size_for_length(
                grapheme_count(&self.text),
                &self.config.font_size_rules,
                self.config.min_font_size,
            )
        } else {
            self.config.base_font_size
        }
    }

    fn font_spec(&self) -> FontSpec {
        FontSpec {
            family: self.config.font_family.clone(),
            size: self.font_size,
        }
    }

    fn wrap_mode(&self) -> WrapMode {
        if self.config.multiline {
            WrapMode::WordChar
        } else {
            WrapMode::None
        }
    }

    fn trace_edit(&self, operation: &'static str) {
        let _span = tracing::debug_span!(
            "ainput.edit",
            operation,
            cursor_position = self.cursor,
            grapheme_count = grapheme_count(&self.text),
            dictation_active = self.session.is_some()
        )
        .entered();
    }
}

impl<M: TextMeasurer> Drop for ValueController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn constraints_of(config: &InputConfig) -> HeightConstraints {
    HeightConstraints {
        min_height: config.min_height,
        max_height: config.max_height,
        inset_top: config.inset_top,
        inset_bottom: config.inset_bottom,
    }
}

fn is_return(replacement: &str) -> bool {
    matches!(replacement, "\n" | "\r" | "\r\n")
}

fn mask(text: &str) -> String {
    std::iter::repeat_n(MASK_GLYPH, grapheme_count(text)).collect()
}

fn drop_stale(id: TaskId) {
    let err = Error::StaleTask(id);
    tracing::trace!(error = %err, recovery = ?err.recovery(), "reveal.stale_callback");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ainput_core::Size;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> ValueController {
        let mut c = ValueController::new(InputConfig::default());
        c.set_container_width(200.0);
        c.take_notifications();
        c
    }

    fn texts(notes: &[Notification]) -> Vec<&str> {
        notes
            .iter()
            .filter_map(|n| match n {
                Notification::TextChanged { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn construction_reports_initial_size() {
        let mut c = ValueController::new(InputConfig::default());
        let notes = c.take_notifications();
        assert!(matches!(notes.as_slice(), [Notification::ContentSizeChanged(_)]));
        assert_eq!(c.value(), "");
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn set_value_is_idempotent() {
        let mut c = controller();
        c.set_value("same");
        c.take_notifications();
        c.set_value("same");
        assert!(c.take_notifications().is_empty());
        assert!(c.reveal_tasks().is_empty());
    }

    #[test]
    fn unfocused_set_value_keeps_clamped_cursor() {
        let mut c = controller();
        c.set_value("hello world");
        c.set_selection(8);
        c.set_value("hello");
        assert_eq!(c.cursor(), 5);
        c.set_value("hello there");
        assert_eq!(c.cursor(), 5);
    }

    #[test]
    fn focused_set_value_moves_cursor_to_end() {
        let mut c = controller();
        c.focus();
        c.set_value("abc");
        assert_eq!(c.cursor(), 3);
    }

    #[test]
    fn user_edit_places_cursor_after_replacement() {
        let mut c = controller();
        c.set_value("held");
        assert!(c.submit_user_edit("hello", TextRange::new(3, 1), "lo"));
        assert_eq!(c.value(), "hello");
        assert_eq!(c.cursor(), 5);
        assert_eq!(texts(&c.take_notifications()), vec!["held", "hello"]);
    }

    #[test]
    fn user_edit_rejections() {
        let mut c = controller();
        c.set_value("hello");
        assert_eq!(
            c.try_submit_user_edit("", TextRange::new(4, 3), ""),
            Err(EditRejection::RangeOutOfBounds {
                start: 4,
                len: 3,
                text_len: 5
            })
        );

        c.apply_config(ConfigUpdate::MaxLength(5));
        assert!(!c.submit_user_edit("hello!", TextRange::caret(5), "!"));
        assert_eq!(c.value(), "hello");

        c.apply_config(ConfigUpdate::Editable(false));
        assert_eq!(
            c.try_submit_user_edit("hell", TextRange::new(4, 1), ""),
            Err(EditRejection::NotEditable)
        );
    }

    #[test]
    fn shrinking_over_long_text_is_allowed() {
        let mut c = controller();
        c.set_value("abcdef");
        c.apply_config(ConfigUpdate::MaxLength(3));
        assert!(c.submit_user_edit("abcde", TextRange::new(5, 1), ""));
        assert!(!c.submit_user_edit("abcdex", TextRange::caret(5), "xy"));
    }

    #[test]
    fn single_line_return_submits() {
        let mut c = controller();
        c.apply_config(ConfigUpdate::Multiline(false));
        c.set_value("send me");
        c.take_notifications();
        assert_eq!(
            c.try_submit_user_edit("send me\n", TextRange::caret(7), "\n"),
            Err(EditRejection::SubmitInstead)
        );
        assert_eq!(
            c.take_notifications(),
            vec![Notification::Submit {
                text: "send me".into()
            }]
        );
        assert_eq!(c.value(), "send me");
    }

    #[test]
    fn multiline_return_is_text() {
        let mut c = controller();
        assert!(c.submit_user_edit("\n", TextRange::caret(0), "\n"));
        assert_eq!(c.value(), "\n");
    }

    #[test]
    fn focus_blur_are_idempotent_and_schedule_settle() {
        let mut c = controller();
        c.focus();
        c.focus();
        assert_eq!(c.take_notifications(), vec![Notification::FocusGained]);
        assert_eq!(c.pending_jobs(), SETTLE_DELAYS.len());
        c.blur();
        c.blur();
        assert_eq!(c.take_notifications(), vec![Notification::FocusLost]);
        assert_eq!(c.pending_jobs(), SETTLE_DELAYS.len(), "settles coalesce");
        c.advance(ms(300));
        assert_eq!(c.pending_jobs(), 0);
        assert!(c.take_notifications().is_empty(), "settle never re-reports");
    }

    #[test]
    fn dictation_scenario_reveals_words_in_cascade() {
        let mut c = controller();
        c.set_value("draft: ");
        c.set_selection(7);
        c.set_dictation_active(true);
        c.take_notifications();

        c.set_value("draft: one two");
        assert_eq!(c.value(), "draft: one two");
        assert_eq!(c.cursor(), 14);

        let tasks = c.reveal_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].word(), "one");
        assert_eq!(tasks[1].word(), "two");
        assert!(tasks[0].delay() < tasks[1].delay());
        assert_eq!(
            c.hidden_ranges(),
            vec![TextRange::new(7, 3), TextRange::new(11, 3)]
        );

        c.advance(ms(100));
        assert_eq!(c.reveal_tasks().len(), 2);
        let overlays = c.reveal_overlays();
        assert!(overlays[0].opacity > overlays[1].opacity);

        c.advance(ms(400));
        assert!(c.reveal_tasks().is_empty());
        assert!(c.hidden_ranges().is_empty());
    }

    #[test]
    fn dictation_splices_at_anchor() {
        let mut c = controller();
        c.set_value("hello world");
        c.set_selection(5);
        c.set_dictation_active(true);
        c.set_value("hello world there");
        assert_eq!(c.value(), "hello there world");
        assert_eq!(c.cursor(), 11);
        assert_eq!(c.reveal_tasks().len(), 1);
        assert_eq!(c.reveal_tasks()[0].range(), TextRange::new(6, 5));
    }

    #[test]
    fn new_value_force_completes_in_flight_reveals() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("one two three");
        assert_eq!(c.reveal_tasks().len(), 3);
        c.advance(ms(70));

        c.set_value("one two three four");
        assert_eq!(c.reveal_tasks().len(), 1);
        assert_eq!(c.reveal_tasks()[0].word(), "four");
        assert_eq!(c.hidden_ranges(), vec![TextRange::new(14, 4)]);
    }

    #[test]
    fn ending_session_restores_everything() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("a b c");
        assert!(!c.hidden_ranges().is_empty());
        c.set_dictation_active(false);
        assert!(c.hidden_ranges().is_empty());
        assert!(!c.is_dictation_active());
        assert_eq!(c.pending_jobs(), 0);
    }

    #[test]
    fn repeated_session_state_force_completes() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("x y");
        c.set_dictation_active(true);
        assert!(c.reveal_tasks().is_empty());
        assert!(c.is_dictation_active());
    }

    #[test]
    fn typing_is_not_animated() {
        let mut c = controller();
        assert!(c.submit_user_edit("hi there", TextRange::caret(0), "hi there"));
        assert!(c.reveal_tasks().is_empty());
        c.set_value("hi there you");
        assert!(c.reveal_tasks().is_empty());
    }

    #[test]
    fn interaction_during_dictation_taps_and_rebases() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("one");
        c.take_notifications();

        c.tap();
        assert_eq!(c.take_notifications(), vec![Notification::DictationTap]);

        c.set_selection(0);
        assert_eq!(c.take_notifications(), vec![Notification::DictationTap]);
        assert_eq!(c.dictation_session().map(|s| s.insert_anchor()), Some(0));

        c.set_value("one two");
        assert_eq!(c.value(), "two one");
    }

    #[test]
    fn tap_without_session_is_silent() {
        let mut c = controller();
        c.tap();
        assert!(c.take_notifications().is_empty());
    }

    #[test]
    fn mismatch_falls_back_to_verbatim() {
        let mut c = controller();
        c.set_value("draft");
        c.set_dictation_active(true);
        c.set_value("something else");
        assert_eq!(c.value(), "something else");
        assert!(c.cursor() <= 14);
        c.set_value("something else entirely");
        assert_eq!(c.value(), "something else entirely");
    }

    #[test]
    fn cursor_clamps_when_text_shrinks() {
        let mut c = controller();
        c.set_value("a long sentence");
        c.set_selection(100);
        assert_eq!(c.cursor(), 15);
        c.set_value("");
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn dynamic_sizing_follows_rules() {
        let mut c = controller();
        c.apply_config(ConfigUpdate::DynamicSizing(true));
        assert_eq!(c.font_size(), 32.0);
        c.set_value("x".repeat(21));
        assert_eq!(c.font_size(), 24.0);
        c.set_value("x".repeat(500));
        assert_eq!(c.font_size(), 14.0);
        c.apply_config(ConfigUpdate::DynamicSizing(false));
        assert_eq!(c.font_size(), 16.0);
    }

    #[test]
    fn malformed_rule_table_keeps_previous() {
        let mut c = controller();
        c.apply_configs([
            ConfigUpdate::DynamicSizing(true),
            ConfigUpdate::FontSizeRulesJson(r#"[{"maxLength": 100, "fontSize": 40}]"#.into()),
        ]);
        assert_eq!(c.font_size(), 40.0);
        c.apply_config(ConfigUpdate::FontSizeRulesJson(r#"[{"nope": 1}]"#.into()));
        assert_eq!(c.config().font_size_rules.rules().len(), 1);
        assert_eq!(c.font_size(), 40.0);
        c.apply_config(ConfigUpdate::FontSizeRulesJson("{".into()));
        assert_eq!(c.font_size(), 40.0);
    }

    #[test]
    fn height_tracks_content_and_max() {
        let mut c = controller();
        c.apply_config(ConfigUpdate::MaxHeight(Some(60.0)));
        c.take_notifications();
        c.set_value("word ".repeat(40));
        let sizes: Vec<Size> = c
            .take_notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::ContentSizeChanged(size) => Some(size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![Size::new(200.0, 60.0)]);
        assert!(c.scroll_enabled());
    }

    #[test]
    fn secure_entry_measures_masked_text() {
        let mut c = controller();
        c.set_container_width(100.0);
        c.set_value("\u{5B57}".repeat(20));
        let plain = c.content_height().unwrap();

        c.apply_config(ConfigUpdate::SecureEntry(true));
        let masked = c.content_height().unwrap();
        assert!(masked < plain, "masked {masked} should be below {plain}");

        c.apply_config(ConfigUpdate::SecureEntry(false));
        assert_eq!(c.content_height(), Some(plain));
        assert_eq!(mask("e\u{0301}x"), "\u{2022}\u{2022}");
    }

    #[test]
    fn resent_transcript_keeps_reveal_running() {
        let mut c = controller();
        c.set_value("hello world");
        c.set_selection(5);
        c.set_dictation_active(true);
        c.set_value("hello world there");
        assert_eq!(c.value(), "hello there world");
        c.advance(ms(10));
        assert_eq!(c.reveal_tasks().len(), 1);
        c.take_notifications();

        c.set_value("hello world there");
        assert_eq!(c.value(), "hello there world");
        assert!(c.take_notifications().is_empty());
        assert_eq!(c.reveal_tasks().len(), 1);
        assert_eq!(c.hidden_ranges(), vec![c.reveal_tasks()[0].range()]);

        c.run_until_idle();
        assert!(c.reveal_tasks().is_empty());
    }

    #[test]
    fn teardown_restores_and_clears() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("a b");
        c.focus();
        c.teardown();
        assert!(c.hidden_ranges().is_empty());
        assert_eq!(c.pending_jobs(), 0);
        assert!(!c.is_dictation_active());
    }

    #[test]
    fn run_until_idle_drains_queue() {
        let mut c = controller();
        c.set_dictation_active(true);
        c.set_value("one two three");
        c.focus();
        c.run_until_idle();
        assert_eq!(c.pending_jobs(), 0);
        assert!(c.reveal_tasks().is_empty());
        assert!(c.now() >= ms(120 + 300));
    }
}
