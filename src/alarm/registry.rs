//! Alarm registry: the heap plus its bookkeeping counters.
//!
//! The registry has no synchronization of its own. Every method is called
//! with the [`SchedulerCoordinator`](crate::sync::SchedulerCoordinator) lock
//! held, which is what keeps `pending == heap.len()` true whenever the lock
//! is free.

use super::heap::MinHeap;
use crate::error::{Error, Result};
use crate::types::Deadline;
use serde::Serialize;

/// Default number of alarms the desk can hold at once.
pub const DEFAULT_CAPACITY: usize = 100;

/// Snapshot of the pending and expired counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlarmCounts {
    /// Registered but not yet delivered.
    pub pending: usize,
    /// Delivered since start.
    pub expired: usize,
}

/// Heap of outstanding deadlines with pending/expired counters.
#[derive(Debug)]
pub struct AlarmRegistry {
    heap: MinHeap<Deadline>,
    pending: usize,
    expired: usize,
    awaiting: Option<Deadline>,
}

impl AlarmRegistry {
    /// Creates an empty registry holding at most `capacity` alarms.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: MinHeap::with_capacity(capacity),
            pending: 0,
            expired: 0,
            awaiting: None,
        }
    }

    /// Inserts a deadline and counts it as pending.
    ///
    /// On [`Error::CapacityExceeded`] nothing changes.
    pub fn register(&mut self, deadline: Deadline) -> Result<()> {
        self.heap.insert(deadline)?;
        self.pending += 1;
        Ok(())
    }

    /// Returns the earliest outstanding deadline, or `None` if nothing is
    /// pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Deadline> {
        if self.pending == 0 {
            return None;
        }
        self.heap.peek_min().ok().copied()
    }

    /// Removes and returns the earliest deadline, moving it from pending to
    /// expired.
    pub fn consume_earliest(&mut self) -> Result<Deadline> {
        if self.pending == 0 {
            return Err(Error::EmptyHeap);
        }
        let deadline = self.heap.extract_min()?;
        self.expired += 1;
        self.pending -= 1;
        Ok(deadline)
    }

    /// Zeroes the pending counter for final shutdown reporting.
    ///
    /// The heap keeps its contents and the expired counter is untouched.
    pub fn reset_pending(&mut self) {
        self.pending = 0;
    }

    /// Returns the current counters.
    #[must_use]
    pub fn counts(&self) -> AlarmCounts {
        AlarmCounts {
            pending: self.pending,
            expired: self.expired,
        }
    }

    /// Returns the deadline the waiter is currently blocked on.
    #[must_use]
    pub fn awaiting(&self) -> Option<Deadline> {
        self.awaiting
    }

    pub(crate) fn set_awaiting(&mut self, deadline: Option<Deadline>) {
        self.awaiting = deadline;
    }

    /// Returns the number of deadlines held by the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the heap holds no deadlines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the heap capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Returns true if the pending counter matches the heap size.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.pending == self.heap.len()
    }
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
