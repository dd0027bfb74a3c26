//! Core value types for the wake-up desk.
//!
//! - [`deadline`]: Absolute wake-up instants
//! - [`cancel`]: Cancellation reason and kind types

pub mod cancel;
pub mod deadline;

pub use cancel::{CancelKind, CancelReason};
pub use deadline::Deadline;
