#![forbid(unsafe_code)]

//! Deferred work on a virtual clock.
//!
//! [`DeferredQueue`] holds jobs keyed by due time. Nothing runs on its own:
//! the owner advances the clock and pops due jobs one at a time, so a job
//! handler may schedule further work that still fires in due-time order.
//!
//! # Invariants
//!
//! 1. Entries are kept sorted by `(due, seq)`; jobs with equal due times fire
//!    in scheduling order.
//! 2. `now()` never moves backwards.
//! 3. A popped job's due time is `<= now()` after the pop.
//!
//! Liveness of whatever a job refers to is the handler's concern; the queue
//! never inspects jobs except through [`DeferredQueue::retain`].

use std::time::Duration;

#[derive(Debug, Clone)]
struct Entry<J> {
    due: Duration,
    seq: u64,
    job: J,
}

/// A single-threaded queue of jobs ordered by due time.
#[derive(Debug, Clone)]
pub struct DeferredQueue<J> {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry<J>>,
}

impl<J> Default for DeferredQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> DeferredQueue<J> {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    /// Current virtual time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending jobs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no jobs are pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the earliest pending job.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.first().map(|e| e.due)
    }

    /// Schedule `job` to fire `delay` after the current time.
    ///
    /// Returns the absolute due time.
    pub fn schedule_after(&mut self, delay: Duration, job: J) -> Duration {
        let due = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let pos = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(pos, Entry { due, seq, job });

        #[cfg(feature = "tracing")]
        tracing::trace!(
            due_ms = due.as_millis() as u64,
            pending = self.entries.len(),
            "deferred.schedule"
        );

        due
    }

    /// Pop the earliest job due at or before `until`, moving the clock to its
    /// due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, J)> {
        if self.entries.first().is_none_or(|e| e.due > until) {
            return None;
        }
        let entry = self.entries.remove(0);
        debug_assert!(entry.seq < self.next_seq);
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.job))
    }

    /// Move the clock forward to `time`. Earlier times are ignored.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Keep only the jobs for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&J) -> bool) {
        self.entries.retain(|e| keep(&e.job));
    }

    /// Drop every pending job. The clock is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn pops_in_due_order() {
        let mut q = DeferredQueue::new();
        q.schedule_after(ms(30), "c");
        q.schedule_after(ms(10), "a");
        q.schedule_after(ms(20), "b");

        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(100)))
            .map(|(_, j)| j)
            .collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_due_times_fire_in_schedule_order() {
        let mut q = DeferredQueue::new();
        q.schedule_after(ms(5), 1);
        q.schedule_after(ms(5), 2);
        q.schedule_after(ms(5), 3);
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(5)))
            .map(|(_, j)| j)
            .collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn pop_respects_limit_and_moves_clock() {
        let mut q = DeferredQueue::new();
        q.schedule_after(ms(10), ());
        q.schedule_after(ms(50), ());
        assert!(q.pop_due(ms(5)).is_none());
        assert_eq!(q.pop_due(ms(20)), Some((ms(10), ())));
        assert_eq!(q.now(), ms(10));
        assert!(q.pop_due(ms(20)).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn schedule_is_relative_to_now() {
        let mut q = DeferredQueue::new();
        q.advance_to(ms(100));
        let due = q.schedule_after(ms(16), ());
        assert_eq!(due, ms(116));
        assert_eq!(q.next_due(), Some(ms(116)));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q: DeferredQueue<()> = DeferredQueue::new();
        q.advance_to(ms(40));
        q.advance_to(ms(10));
        assert_eq!(q.now(), ms(40));
    }

    #[test]
    fn retain_and_clear() {
        let mut q = DeferredQueue::new();
        for i in 0..6 {
            q.schedule_after(ms(i), i);
        }
        q.retain(|j| j % 2 == 0);
        assert_eq!(q.len(), 3);
        q.clear();
        assert!(q.is_empty());
        assert!(q.next_due().is_none());
    }
}
