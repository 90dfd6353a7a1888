#![forbid(unsafe_code)]

//! Core: animation primitives, deferred work scheduling, and host-facing events.
//!
//! # Role in the animated input engine
//! `ainput-core` is the leaf layer. It knows nothing about text. It provides
//! the pieces the value controller composes:
//!
//! - **Animation**: a small trait plus [`animation::Fade`] for word reveal
//!   overlays, and [`animation::stagger_offsets`] for cascading delays.
//! - **DeferredQueue**: a single-threaded virtual-clock queue for animation
//!   completion callbacks and layout settle retries.
//! - **Notification**: the events the engine emits to the host bridge.
//! - **Geometry**: sizes in points and grapheme ranges.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod scheduler;

pub use animation::{Animation, Fade};
pub use event::Notification;
pub use geometry::{Size, TextRange};
pub use scheduler::DeferredQueue;
