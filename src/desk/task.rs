//! Guest and waiter tasks.
//!
//! Each task runs on its own named thread and does one unit of work against
//! the shared [`SchedulerCoordinator`]: a guest registers one deadline, a
//! waiter delivers one alarm. The returned [`TaskHandle`] can cancel the task
//! and join it.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::sync::{AlarmOutcome, SchedulerCoordinator, WaiterState};
use crate::types::{CancelReason, Deadline};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle to a running guest or waiter.
///
/// Dropping the handle detaches the thread; the task still finishes its
/// current step and releases the coordinator lock on its own.
#[derive(Debug)]
pub struct TaskHandle<T> {
    label: &'static str,
    token: CancelToken,
    thread: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    fn spawn(
        label: &'static str,
        coordinator: Arc<SchedulerCoordinator>,
        body: impl FnOnce(&SchedulerCoordinator, &CancelToken) -> Result<T> + Send + 'static,
    ) -> Result<Self> {
        let token = CancelToken::new();
        let thread = {
            let token = token.clone();
            thread::Builder::new()
                .name(format!("wakedesk-{label}"))
                .spawn(move || body(&coordinator, &token))
                .map_err(|source| Error::Spawn { label, source })?
        };
        Ok(Self {
            label,
            token,
            thread,
        })
    }

    /// Requests cancellation.
    ///
    /// A blocked waiter is woken through its token; the task observes the
    /// request at its next safe point.
    pub fn cancel(&self, reason: CancelReason) {
        self.token.cancel(reason);
    }

    /// Returns true once the task's thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Returns the task's cancellation token.
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Waits for the task and returns its result.
    ///
    /// A panic inside the task becomes [`Error::TaskPanicked`].
    pub fn join(self) -> Result<T> {
        self.thread
            .join()
            .map_err(|_| Error::TaskPanicked(self.label))?
    }
}

/// Producer: registers a single wake-up deadline.
#[derive(Debug)]
pub struct GuestTask;

impl GuestTask {
    /// Spawns a guest that registers `deadline`.
    pub fn spawn(
        coordinator: Arc<SchedulerCoordinator>,
        deadline: Deadline,
    ) -> Result<TaskHandle<()>> {
        TaskHandle::spawn("guest", coordinator, move |coordinator, token| {
            coordinator.register_alarm(token, deadline)
        })
    }
}

/// Consumer: delivers exactly one alarm, then exits.
#[derive(Debug)]
pub struct WaiterTask;

impl WaiterTask {
    /// Spawns a waiter that blocks until the earliest pending alarm elapses.
    pub fn spawn(coordinator: Arc<SchedulerCoordinator>) -> Result<TaskHandle<AlarmOutcome>> {
        TaskHandle::spawn("waiter", coordinator, |coordinator, token| {
            coordinator.await_next_alarm(token)
        })
    }

    /// Maps a finished waiter's result onto its terminal protocol state.
    ///
    /// `NoAlarmsPending` ends in `Idle`; other errors are passed through.
    pub fn final_state(result: Result<AlarmOutcome>) -> Result<WaiterState> {
        match result {
            Ok(AlarmOutcome::Expired(report)) => Ok(WaiterState::Expired(report.wake_time)),
            Ok(AlarmOutcome::NoAlarmsPending) => Ok(WaiterState::Idle),
            Err(Error::Cancelled(_)) => Ok(WaiterState::Cancelled),
            Err(err) => Err(err),
        }
    }
}
