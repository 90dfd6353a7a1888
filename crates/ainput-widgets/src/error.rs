#![forbid(unsafe_code)]

//! Error taxonomy for the input engine.
//!
//! Nothing here is fatal. Every variant maps to a [`RecoveryAction`] the
//! controller takes on its own; the typed values exist so callers of the
//! `try_*` entry points and log readers can tell the cases apart.

use std::fmt;

pub use ainput_text::ConfigError;

use crate::reveal::TaskId;

/// Why an edit was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRejection {
    /// The control is read-only.
    NotEditable,
    /// The edit range does not lie inside the current text.
    RangeOutOfBounds {
        /// Range start (graphemes).
        start: usize,
        /// Range length (graphemes).
        len: usize,
        /// Current text length (graphemes).
        text_len: usize,
    },
    /// The result would exceed the configured maximum length.
    MaxLengthExceeded {
        /// Configured maximum.
        max: usize,
        /// Length the edit would produce.
        resulting: usize,
    },
    /// Return on a single-line control; a submit was emitted instead.
    SubmitInstead,
}

impl fmt::Display for EditRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEditable => write!(f, "control is not editable"),
            Self::RangeOutOfBounds {
                start,
                len,
                text_len,
            } => write!(
                f,
                "edit range {start}+{len} is outside text of length {text_len}"
            ),
            Self::MaxLengthExceeded { max, resulting } => {
                write!(f, "edit would produce {resulting} graphemes, max is {max}")
            }
            Self::SubmitInstead => write!(f, "return on single-line control submits"),
        }
    }
}

impl std::error::Error for EditRejection {}

/// What the engine does when it meets an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Keep the previous (or default) configuration value.
    KeepPrevious,
    /// Tell the host to drop the keystroke.
    DiscardKeystroke,
    /// Accept the incoming value as-is.
    VerbatimReplace,
    /// Ignore a deferred callback.
    DropCallback,
}

/// Any recoverable condition the engine handles.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed configuration.
    Config(ConfigError),
    /// Rejected edit.
    Edit(EditRejection),
    /// A dictation update did not extend the session baseline.
    ReconcileMismatch {
        /// Baseline length the update was expected to extend (graphemes).
        baseline_len: usize,
    },
    /// A deferred reveal callback fired for a task that no longer exists.
    StaleTask(TaskId),
}

impl Error {
    /// How the engine recovers.
    #[must_use]
    pub fn recovery(&self) -> RecoveryAction {
        match self {
            Self::Config(_) => RecoveryAction::KeepPrevious,
            Self::Edit(_) => RecoveryAction::DiscardKeystroke,
            Self::ReconcileMismatch { .. } => RecoveryAction::VerbatimReplace,
            Self::StaleTask(_) => RecoveryAction::DropCallback,
        }
    }

    /// Short label for structured logs.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Edit(_) => "edit",
            Self::ReconcileMismatch { .. } => "reconcile_mismatch",
            Self::StaleTask(_) => "stale_task",
        }
    }

    /// Always true: the engine never gives up on its own state.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Edit(err) => write!(f, "{err}"),
            Self::ReconcileMismatch { baseline_len } => write!(
                f,
                "dictation update does not extend the {baseline_len}-grapheme baseline"
            ),
            Self::StaleTask(id) => write!(f, "reveal task {} is no longer live", id.get()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Edit(err) => Some(err),
            Self::ReconcileMismatch { .. } | Self::StaleTask(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<EditRejection> for Error {
    fn from(err: EditRejection) -> Self {
        Self::Edit(err)
    }
}
