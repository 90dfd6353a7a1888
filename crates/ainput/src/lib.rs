#![forbid(unsafe_code)]

//! Animated input engine: public facade.
//!
//! This crate re-exports the stable surface of the internal crates and
//! offers a prelude for hosts wiring the engine to a rendering bridge.

// --- Core re-exports -------------------------------------------------------

pub use ainput_core::animation::{Animation, Fade};
pub use ainput_core::event::Notification;
pub use ainput_core::geometry::{Size, TextRange};

// --- Text re-exports -------------------------------------------------------

pub use ainput_text::probe::{FontMetrics, FontSpec, LayoutProbe, TextMeasurer};
pub use ainput_text::sizing::{FontSizeRule, FontSizeRules, font_size_for_length};
pub use ainput_text::wrap::WrapMode;

// --- Widget re-exports -----------------------------------------------------

pub use ainput_widgets::config::{
    Alignment, Autocapitalize, ConfigUpdate, InputConfig, KeyboardType, ReturnKeyType,
};
pub use ainput_widgets::controller::ValueController;
pub use ainput_widgets::dictation::{DictationSession, Reconciled};
pub use ainput_widgets::error::{ConfigError, EditRejection, Error, RecoveryAction};
pub use ainput_widgets::reveal::{AnimationTask, RevealOverlay, TaskId, TaskState};

/// Standard result type for engine APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ConfigUpdate, EditRejection, Error, FontSpec, InputConfig, Notification, Result,
        RevealOverlay, Size, TextMeasurer, TextRange, ValueController,
    };

    pub use crate::{core, text, widgets};
}

pub use ainput_core as core;
pub use ainput_text as text;
pub use ainput_widgets as widgets;
