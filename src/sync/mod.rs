//! Synchronization for the alarm registry.
//!
//! The [`SchedulerCoordinator`] is the only way tasks reach the shared
//! registry: one mutex serializes registrations and consumptions, and one
//! condition variable carries both the "new deadline" signal and the bounded
//! wait.

pub mod coordinator;

pub use coordinator::{AlarmOutcome, ExpiredAlarmReport, SchedulerCoordinator, WaiterState};
