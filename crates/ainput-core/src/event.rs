#![forbid(unsafe_code)]

//! Notifications emitted to the host bridge.

use crate::geometry::Size;

/// An event the engine reports to the host.
///
/// Notifications are queued in emission order; the host drains them after
/// each command it forwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The committed text changed. Carries the full current text.
    TextChanged {
        /// Full committed text.
        text: String,
    },

    /// The control gained input focus.
    FocusGained,

    /// The control lost input focus.
    FocusLost,

    /// Return was pressed on a single-line control.
    Submit {
        /// Committed text at the time of submission.
        text: String,
    },

    /// The height required by the content changed.
    ContentSizeChanged(Size),

    /// The user interacted with the control while dictation was active.
    DictationTap,
}

impl Notification {
    /// Stable name for logging and bridge event routing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextChanged { .. } => "text_changed",
            Self::FocusGained => "focus_gained",
            Self::FocusLost => "focus_lost",
            Self::Submit { .. } => "submit",
            Self::ContentSizeChanged(_) => "content_size_changed",
            Self::DictationTap => "dictation_tap",
        }
    }
}
