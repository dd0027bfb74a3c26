//! Wakedesk: a cancel-correct wake-up-call desk.
//!
//! # Overview
//!
//! Guests register wake-up deadlines; a waiter sleeps until the earliest one
//! and delivers it. A later registration with an earlier deadline preempts
//! the waiter's current sleep. Every task can be cancelled, and cancellation
//! never leaves the shared lock held or the counters half-updated.
//!
//! # Core Guarantees
//!
//! - **Earliest first**: The waiter always re-reads the heap minimum after waking
//! - **Bounded storage**: Registrations beyond capacity fail without side effects
//! - **Consistent counters**: `pending` always equals the number of stored deadlines
//! - **Cancel-correctness**: Cancellation is observed only where no lock is held
//! - **Clean shutdown**: Pending calls are reset and final counts reported
//!
//! # Module Structure
//!
//! - [`alarm`]: Fixed-capacity min-heap and the alarm registry
//! - [`sync`]: Mutex/condvar coordinator for registration and waiting
//! - [`cancel`]: Cooperative cancellation tokens
//! - [`desk`]: Guests, waiters, reporting, and the session loop
//! - [`config`]: Desk configuration and validation
//! - [`types`]: Deadlines and cancellation reasons
//! - [`util`]: Deterministic and OS entropy sources
//! - [`error`](mod@error): Error types
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use wakedesk::cancel::CancelToken;
//! use wakedesk::{AlarmOutcome, Deadline, SchedulerCoordinator};
//!
//! let desk = SchedulerCoordinator::new(4);
//! let token = CancelToken::new();
//! let due = Deadline::now().saturating_add(Duration::from_millis(5));
//! desk.register_alarm(&token, due).unwrap();
//!
//! let outcome = desk.await_next_alarm(&token).unwrap();
//! let report = outcome.report().unwrap();
//! assert_eq!(report.wake_time, due);
//! assert_eq!(report.expired, 1);
//! assert_eq!(report.pending, 0);
//! assert!(matches!(
//!     desk.await_next_alarm(&token).unwrap(),
//!     AlarmOutcome::NoAlarmsPending
//! ));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod alarm;
pub mod cancel;
pub mod config;
pub mod desk;
pub mod error;
pub mod sync;
pub mod tracing_compat;
pub mod types;
pub mod util;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(test)]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use alarm::{AlarmCounts, AlarmRegistry, DEFAULT_CAPACITY, MinHeap};
pub use cancel::CancelToken;
pub use config::{ConfigError, DeskConfig};
pub use desk::{ConsoleReporter, Desk, DeskEvent, DeskReporter, DeskSummary, Guest};
pub use error::{Error, ErrorKind, HeapError, Result};
pub use sync::{AlarmOutcome, ExpiredAlarmReport, SchedulerCoordinator, WaiterState};
pub use types::{CancelKind, CancelReason, Deadline};
