#![forbid(unsafe_code)]

//! Word reveal tasks and the hidden-range set.
//!
//! Each newly dictated word gets an [`AnimationTask`]. While a task is live
//! its range is hidden in the committed text and the host draws an overlay
//! in its place:
//!
//! ```text
//! Pending ──start──▶ Revealing ──complete──▶ Done (removed)
//!    │                   │
//!    └──── force_complete_all ────▶ Done (removed)
//! ```
//!
//! The hidden-range set is derived from the live tasks, so a range is hidden
//! exactly while its task exists. Deferred callbacks refer to tasks by
//! [`TaskId`] and must tolerate the task being gone.

use std::time::Duration;

use ainput_core::TextRange;
use ainput_core::animation::{Animation, Fade, ease_out};

/// Identifier of a reveal task. Never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting out its stagger delay. The range is already hidden.
    Pending,
    /// Overlay fading in.
    Revealing,
    /// Finished; the range is visible again.
    Done,
}

/// One word being revealed.
#[derive(Debug, Clone)]
pub struct AnimationTask {
    id: TaskId,
    word: String,
    range: TextRange,
    delay: Duration,
    state: TaskState,
    fade: Fade,
    started_at: Option<Duration>,
}

impl AnimationTask {
    #[inline]
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Grapheme range of the word in the committed text.
    #[inline]
    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Stagger delay before the fade starts.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Length of the fade.
    #[inline]
    #[must_use]
    pub fn fade_duration(&self) -> Duration {
        self.fade.duration()
    }

    /// Overlay opacity at virtual time `now`.
    #[must_use]
    pub fn opacity(&self, now: Duration) -> f32 {
        match (self.state, self.started_at) {
            (TaskState::Revealing, Some(start)) => {
                let mut fade = self.fade;
                fade.reset();
                fade.tick(now.saturating_sub(start));
                fade.value()
            }
            (TaskState::Done, _) => 1.0,
            _ => 0.0,
        }
    }
}

/// What the host draws for one live task.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOverlay {
    pub id: TaskId,
    pub word: String,
    pub range: TextRange,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Live reveal tasks, in creation order.
#[derive(Debug, Clone)]
pub struct RevealRegistry {
    tasks: Vec<AnimationTask>,
    next_id: u64,
    duration: Duration,
}

impl Default for RevealRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl RevealRegistry {
    /// Create a registry whose fades last `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            duration,
        }
    }

    /// Fade duration for tasks spawned from now on.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &[AnimationTask] {
        &self.tasks
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn is_live(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Create a pending task. Its range is hidden immediately.
    pub fn spawn(&mut self, word: impl Into<String>, range: TextRange, delay: Duration) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(AnimationTask {
            id,
            word: word.into(),
            range,
            delay,
            state: TaskState::Pending,
            fade: Fade::new(self.duration).easing(ease_out),
            started_at: None,
        });
        id
    }

    /// Move a pending task to `Revealing` and return its fade duration.
    /// `None` if the task is gone or already started.
    pub fn begin(&mut self, id: TaskId, now: Duration) -> Option<Duration> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.state == TaskState::Pending => {
                task.state = TaskState::Revealing;
                task.started_at = Some(now);
                Some(task.fade.duration())
            }
            _ => None,
        }
    }

    /// Finish a task, restoring its range. `None` if it is no longer live.
    pub fn complete(&mut self, id: TaskId) -> Option<AnimationTask> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let mut task = self.tasks.remove(index);
        task.state = TaskState::Done;
        task.fade.finish();
        Some(task)
    }

    /// Finish every task at once. Returns how many were live.
    pub fn force_complete_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    /// Ranges currently hidden, in creation order.
    #[must_use]
    pub fn hidden_ranges(&self) -> Vec<TextRange> {
        self.tasks.iter().map(|t| t.range).collect()
    }

    /// Whether grapheme `index` is hidden.
    #[must_use]
    pub fn is_hidden(&self, index: usize) -> bool {
        self.tasks.iter().any(|t| t.range.contains(index))
    }

    /// Overlays for every live task at virtual time `now`.
    #[must_use]
    pub fn overlays(&self, now: Duration) -> Vec<RevealOverlay> {
        self.tasks
            .iter()
            .map(|t| RevealOverlay {
                id: t.id,
                word: t.word.clone(),
                range: t.range,
                opacity: t.opacity(now),
            })
            .collect()
    }
}
