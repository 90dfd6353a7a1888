#![forbid(unsafe_code)]

//! The animated input engine.
//!
//! # Role
//! `ainput-widgets` holds the stateful parts of the input: the
//! [`ValueController`] that owns the text, the dictation reconciler that
//! splices transcripts at the user's cursor, the word reveal registry, and
//! the auto-grow height tracker. Measurement and sizing policy come from
//! `ainput-text`; the virtual clock and notifications from `ainput-core`.
//!
//! The host drives everything through the controller:
//!
//! ```
//! use std::time::Duration;
//! use ainput_widgets::{InputConfig, ValueController};
//!
//! let mut input = ValueController::new(InputConfig::default());
//! input.set_container_width(240.0);
//! input.set_dictation_active(true);
//! input.set_value("dictated words");
//! assert_eq!(input.reveal_tasks().len(), 2);
//!
//! input.advance(Duration::from_secs(1));
//! assert!(input.hidden_ranges().is_empty());
//! for note in input.take_notifications() {
//!     println!("{}", note.name());
//! }
//! ```

pub mod auto_grow;
pub mod config;
pub mod controller;
pub mod dictation;
pub mod error;
pub mod reveal;

pub use auto_grow::{AutoGrowTracker, GrowPhase, HeightConstraints};
pub use config::{
    Alignment, Autocapitalize, ConfigUpdate, InputConfig, KeyboardType, ReturnKeyType,
};
pub use controller::{SETTLE_DELAYS, ValueController};
pub use dictation::{DictationSession, Reconciled, WordSpan, new_words};
pub use error::{ConfigError, EditRejection, Error, RecoveryAction};
pub use reveal::{AnimationTask, RevealOverlay, RevealRegistry, TaskId, TaskState};
