//! Lock and condition-variable protocol around the alarm registry.
//!
//! Guests register deadlines and signal; the waiter blocks until the earliest
//! deadline passes and consumes it. One condition variable serves both the
//! "new deadline arrived" signal and the bounded wait itself.
//!
//! # Waiter protocol
//!
//! 1. Acquire the lock.
//! 2. If nothing is pending, release and report [`AlarmOutcome::NoAlarmsPending`].
//! 3. Read the heap's current minimum and wait on the condition variable until
//!    that absolute instant.
//! 4. On a signal, go back to 3 with a freshly read minimum. A guest that
//!    registers an earlier deadline shortens the wait this way.
//! 5. Once the minimum has elapsed, consume it and report it with the
//!    updated counts.
//!
//! # Cancel safety
//!
//! Cancellation is observed before the lock is taken and at each wake-up of
//! the wait loop, never between a heap mutation and its counter update. A
//! cancelled waiter consumes nothing and returns with the lock released.
//! While it waits, the coordinator is registered as a waker on the caller's
//! [`CancelToken`], so cancelling the token alone ends the wait promptly.

use crate::alarm::{AlarmCounts, AlarmRegistry, DEFAULT_CAPACITY};
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::tracing_compat::{debug, info, trace, warn};
use crate::types::{CancelReason, Deadline};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::Arc;
use std::task::{Wake, Waker};
use std::time::Instant;

/// A delivered wake-up call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiredAlarmReport {
    /// The deadline that elapsed.
    pub wake_time: Deadline,
    /// Pending alarms after this delivery.
    pub pending: usize,
    /// Alarms delivered so far, including this one.
    pub expired: usize,
}

/// Result of a waiter's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlarmOutcome {
    /// The earliest alarm elapsed and was consumed.
    Expired(ExpiredAlarmReport),
    /// Nothing was registered, so there was nothing to wait for.
    NoAlarmsPending,
}

impl AlarmOutcome {
    /// Returns the delivered report, if any.
    #[must_use]
    pub const fn report(&self) -> Option<&ExpiredAlarmReport> {
        match self {
            Self::Expired(report) => Some(report),
            Self::NoAlarmsPending => None,
        }
    }
}

/// Where the waiter stands in its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "deadline", rename_all = "snake_case")]
pub enum WaiterState {
    /// Not waiting on anything.
    Idle,
    /// Blocked until the given deadline, or until a guest signals.
    Waiting(Deadline),
    /// The given deadline elapsed and was consumed.
    Expired(Deadline),
    /// Cancelled before delivering anything.
    Cancelled,
}

impl WaiterState {
    /// Returns true for `Expired` and `Cancelled`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired(_) | Self::Cancelled)
    }
}

/// Serializes access to the [`AlarmRegistry`] and runs the wait protocol.
///
/// Constructed once and shared by reference (usually an `Arc`) with every
/// guest and waiter.
#[derive(Debug)]
pub struct SchedulerCoordinator {
    core: Arc<Core>,
    shutdown: CancelToken,
}

/// The lock and condition variable, shared with cancellation wakers.
#[derive(Debug)]
struct Core {
    registry: Mutex<AlarmRegistry>,
    wakeup: Condvar,
}

impl Core {
    /// Taking the lock first orders the wake-up after any waiter that is
    /// between its cancellation check and its wait.
    fn notify_locked(&self) {
        let _registry = self.registry.lock();
        self.wakeup.notify_all();
    }
}

impl Wake for Core {
    fn wake(self: Arc<Self>) {
        self.notify_locked();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.notify_locked();
    }
}

impl SchedulerCoordinator {
    /// Creates a coordinator whose heap holds at most `capacity` alarms.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            core: Arc::new(Core {
                registry: Mutex::new(AlarmRegistry::new(capacity)),
                wakeup: Condvar::new(),
            }),
            shutdown: CancelToken::new(),
        }
    }

    /// Creates a coordinator with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Registers a wake-up deadline and signals the waiter.
    ///
    /// Fails with [`Error::CapacityExceeded`] if the heap is full (the guest is
    /// not recorded) or [`Error::Cancelled`] if `cancel` was requested before
    /// the lock was taken or the desk shutdown before the deadline was stored.
    pub fn register_alarm(&self, cancel: &CancelToken, deadline: Deadline) -> Result<()> {
        self.checkpoint(cancel)?;

        let mut registry = self.core.registry.lock();
        // Shutdown cancels its token before taking the lock.
        if self.shutdown.is_cancelled() {
            drop(registry);
            let reason = self.shutdown.reason().unwrap_or_else(CancelReason::shutdown);
            debug!(deadline = %deadline, reason = %reason, "registration after shutdown");
            return Err(Error::Cancelled(reason));
        }
        let registered = registry.register(deadline);
        let counts = registry.counts();
        if registered.is_ok() {
            self.core.wakeup.notify_all();
        }
        drop(registry);

        match &registered {
            Ok(()) => debug!(
                deadline = %deadline,
                pending = counts.pending,
                "alarm registered"
            ),
            Err(err) => warn!(deadline = %deadline, error = %err, "alarm rejected"),
        }
        registered
    }

    /// Blocks until the earliest pending alarm elapses, then consumes it.
    ///
    /// Returns [`AlarmOutcome::NoAlarmsPending`] immediately if nothing is
    /// registered. Fails with [`Error::Cancelled`] if `cancel` or the desk
    /// shutdown is requested before delivery; in that case nothing is
    /// consumed. Cancelling `cancel` from another thread wakes the wait.
    pub fn await_next_alarm(&self, cancel: &CancelToken) -> Result<AlarmOutcome> {
        self.checkpoint(cancel)?;
        let waker = Waker::from(Arc::clone(&self.core));
        let _registration = cancel.register_waker(&waker);

        let mut registry = self.core.registry.lock();
        let result = loop {
            if let Some(reason) = self.cancel_reason(cancel) {
                break Err(Error::Cancelled(reason));
            }
            let Some(target) = registry.next_deadline() else {
                break Ok(AlarmOutcome::NoAlarmsPending);
            };
            if registry.awaiting() != Some(target) {
                debug!(
                    deadline = %target,
                    previous = ?registry.awaiting(),
                    "waiter armed"
                );
                registry.set_awaiting(Some(target));
            }

            let now = Deadline::now();
            if target.has_elapsed(now) {
                break registry.consume_earliest().map(|wake_time| {
                    let counts = registry.counts();
                    AlarmOutcome::Expired(ExpiredAlarmReport {
                        wake_time,
                        pending: counts.pending,
                        expired: counts.expired,
                    })
                });
            }

            let until = Instant::now() + target.duration_since(now);
            if self.core.wakeup.wait_until(&mut registry, until).timed_out() {
                trace!(deadline = %target, "wait timed out");
            }
        };
        registry.set_awaiting(None);
        drop(registry);

        match &result {
            Ok(AlarmOutcome::Expired(report)) => info!(
                wake_time = %report.wake_time,
                pending = report.pending,
                expired = report.expired,
                "alarm expired"
            ),
            Ok(AlarmOutcome::NoAlarmsPending) => debug!("no alarms pending"),
            Err(err) => debug!(error = %err, "waiter unwound"),
        }
        result
    }

    /// Cancels every in-flight and future guest and waiter, and zeroes the
    /// pending counter for final reporting.
    ///
    /// The heap is not drained. Returns the counts after the reset.
    pub fn request_shutdown(&self, reason: CancelReason) -> AlarmCounts {
        self.shutdown.cancel(reason);

        let mut registry = self.core.registry.lock();
        registry.reset_pending();
        let counts = registry.counts();
        self.core.wakeup.notify_all();
        drop(registry);

        info!(
            pending = counts.pending,
            expired = counts.expired,
            "shutdown requested"
        );
        counts
    }

    /// Returns a consistent snapshot of the counters.
    #[must_use]
    pub fn current_counts(&self) -> AlarmCounts {
        self.core.registry.lock().counts()
    }

    /// Returns the deadline the waiter is currently blocked on, if any.
    #[must_use]
    pub fn awaiting(&self) -> Option<Deadline> {
        self.core.registry.lock().awaiting()
    }

    /// Returns the waiter's non-terminal protocol state.
    #[must_use]
    pub fn waiter_state(&self) -> WaiterState {
        self.awaiting().map_or(WaiterState::Idle, WaiterState::Waiting)
    }

    /// Wakes every blocked waiter so it re-checks its cancellation state.
    pub fn wake_waiters(&self) {
        self.core.notify_locked();
    }

    /// Returns true once [`request_shutdown`](Self::request_shutdown) has run.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Returns the desk-wide shutdown token.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancelToken {
        &self.shutdown
    }

    /// Returns true if some task currently holds the registry lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.core.registry.is_locked()
    }

    /// Runs `f` against the registry under the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&AlarmRegistry) -> R) -> R {
        f(&self.core.registry.lock())
    }

    fn cancel_reason(&self, cancel: &CancelToken) -> Option<CancelReason> {
        if cancel.is_cancelled() {
            return Some(cancel.reason().unwrap_or_default());
        }
        if self.shutdown.is_cancelled() {
            return Some(self.shutdown.reason().unwrap_or_else(CancelReason::shutdown));
        }
        None
    }

    fn checkpoint(&self, cancel: &CancelToken) -> Result<()> {
        cancel.checkpoint()?;
        self.shutdown.checkpoint()
    }
}

impl Default for SchedulerCoordinator {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
