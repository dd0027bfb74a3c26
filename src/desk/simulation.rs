//! The front-desk driving loop.
//!
//! Each cycle admits one random guest, pauses for a random interval, and makes
//! sure a waiter is on duty. At most one waiter is active at a time; when it
//! delivers its call it is reported and, while calls remain, replaced. A
//! bounded run (`max_guests`) keeps serving until every call is delivered.
//! Raising the stop flag ends the session at the next pause slice: in-flight
//! tasks are cancelled, pending is reset, and the final counts reported.

use crate::alarm::AlarmCounts;
use crate::config::DeskConfig;
use crate::desk::Guest;
use crate::desk::report::{DeskEvent, DeskReporter};
use crate::desk::task::{GuestTask, TaskHandle, WaiterTask};
use crate::error::{Error, Result};
use crate::sync::{AlarmOutcome, SchedulerCoordinator, WaiterState};
use crate::tracing_compat::{debug, info, warn};
use crate::types::{CancelReason, Deadline};
use crate::util::{DetEntropy, EntropySource, OsEntropy};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Granularity at which pauses check the stop flag and the waiter.
const POLL_SLICE: Duration = Duration::from_millis(10);

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeskSummary {
    /// Guests admitted.
    pub guests: u64,
    /// Registrations accepted.
    pub registered: u64,
    /// Registrations refused.
    pub rejected: u64,
    /// Wake-up calls delivered.
    pub delivered: u64,
    /// Counts after the shutdown reset.
    pub final_counts: AlarmCounts,
    /// True if the stop flag ended the session.
    pub interrupted: bool,
}

/// A wake-up desk session.
pub struct Desk<R> {
    config: DeskConfig,
    coordinator: Arc<SchedulerCoordinator>,
    entropy: Arc<dyn EntropySource>,
    reporter: R,
    stop: Arc<AtomicBool>,
    waiter: Option<TaskHandle<AlarmOutcome>>,
    summary: DeskSummary,
}

impl<R: DeskReporter> Desk<R> {
    /// Creates a session from a validated configuration.
    pub fn new(config: DeskConfig, reporter: R) -> Result<Self> {
        config.validate()?;
        let entropy: Arc<dyn EntropySource> = match config.seed {
            Some(seed) => Arc::new(DetEntropy::new(seed)),
            None => Arc::new(OsEntropy),
        };
        Ok(Self {
            coordinator: Arc::new(SchedulerCoordinator::new(config.capacity)),
            config,
            entropy,
            reporter,
            stop: Arc::new(AtomicBool::new(false)),
            waiter: None,
            summary: DeskSummary::default(),
        })
    }

    /// Replaces the stop flag, e.g. with one wired to SIGINT.
    #[must_use]
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Returns the flag that ends the session when set.
    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Returns the shared coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<SchedulerCoordinator> {
        &self.coordinator
    }

    /// Returns the reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consumes the session and returns its reporter.
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Runs the session until the stop flag is raised or, for bounded runs,
    /// until every admitted guest has been woken.
    ///
    /// The desk is shut down on every exit path; an error from the session
    /// is returned after the waiter is cancelled and the counts reset.
    pub fn run(&mut self) -> Result<DeskSummary> {
        info!(
            capacity = self.config.capacity,
            entropy = self.entropy.source_id(),
            max_guests = ?self.config.max_guests,
            "desk open"
        );

        let served = self.serve();
        self.close(served)
    }

    fn close(&mut self, served: Result<()>) -> Result<DeskSummary> {
        let summary = self.shut_down();
        if let Err(err) = served {
            warn!(error = %err, "desk closed after failure");
            return Err(err);
        }
        Ok(summary)
    }

    fn serve(&mut self) -> Result<()> {
        while !self.stopped() && self.admitting() {
            self.admit_guest()?;
            let interval = self.random_interval();
            if !self.pause(interval)? {
                return Ok(());
            }
            self.ensure_waiter()?;
        }
        if !self.stopped() {
            self.serve_remaining()?;
        }
        Ok(())
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn admitting(&self) -> bool {
        self.config
            .max_guests
            .is_none_or(|max| self.summary.guests < max)
    }

    fn random_interval(&self) -> Duration {
        let spread = self.config.max_interval - self.config.min_interval;
        let units = self.config.min_interval + self.entropy.next_below(spread + 1);
        self.config.units(units)
    }

    fn admit_guest(&mut self) -> Result<()> {
        let guest = Guest::random(self.entropy.as_ref(), &self.config, Deadline::now());
        self.summary.guests += 1;

        let registered = GuestTask::spawn(Arc::clone(&self.coordinator), guest.wake_at)?.join();
        match registered {
            Ok(()) => {
                self.summary.registered += 1;
                self.emit(&DeskEvent::Registered { guest });
            }
            Err(err @ Error::CapacityExceeded { .. }) => {
                self.summary.rejected += 1;
                self.emit(&DeskEvent::Rejected {
                    guest,
                    reason: err.to_string(),
                });
            }
            Err(Error::Cancelled(reason)) => {
                debug!(room = guest.room, reason = %reason, "guest cancelled");
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    /// Sleeps for `total`, collecting a finished waiter along the way.
    ///
    /// Returns `false` if the stop flag was raised.
    fn pause(&mut self, total: Duration) -> Result<bool> {
        let until = Instant::now() + total;
        loop {
            self.collect_waiter()?;
            if self.stopped() {
                return Ok(false);
            }
            let now = Instant::now();
            if now >= until {
                return Ok(true);
            }
            thread::sleep(POLL_SLICE.min(until - now));
        }
    }

    fn serve_remaining(&mut self) -> Result<()> {
        loop {
            self.ensure_waiter()?;
            if self.waiter.is_none() || !self.pause(POLL_SLICE)? {
                return Ok(());
            }
        }
    }

    /// Starts a waiter if none is active and calls are pending.
    fn ensure_waiter(&mut self) -> Result<()> {
        self.collect_waiter()?;
        if self.waiter.is_none() && self.coordinator.current_counts().pending > 0 {
            self.waiter = Some(WaiterTask::spawn(Arc::clone(&self.coordinator))?);
        }
        Ok(())
    }

    /// Joins and reports the active waiter if it has finished.
    fn collect_waiter(&mut self) -> Result<()> {
        if self.waiter.as_ref().is_some_and(TaskHandle::is_finished) {
            if let Some(waiter) = self.waiter.take() {
                self.finish_waiter(waiter)?;
            }
        }
        Ok(())
    }

    fn finish_waiter(&mut self, waiter: TaskHandle<AlarmOutcome>) -> Result<WaiterState> {
        let result = waiter.join();
        if let Ok(AlarmOutcome::Expired(report)) = &result {
            self.summary.delivered += 1;
            self.emit(&DeskEvent::Woke(*report));
        }
        WaiterTask::final_state(result)
    }

    fn shut_down(&mut self) -> DeskSummary {
        let reason = CancelReason::shutdown();
        if let Some(waiter) = self.waiter.take() {
            waiter.cancel(reason.clone());
            match self.finish_waiter(waiter) {
                Ok(state) => debug!(state = ?state, "waiter stopped"),
                Err(err) => warn!(error = %err, "waiter failed during shutdown"),
            }
        }
        let counts = self.coordinator.request_shutdown(reason);
        self.emit(&DeskEvent::Shutdown { counts });

        self.summary.final_counts = counts;
        self.summary.interrupted = self.stopped();
        info!(
            guests = self.summary.guests,
            delivered = self.summary.delivered,
            interrupted = self.summary.interrupted,
            "desk closed"
        );
        self.summary
    }

    fn emit(&mut self, event: &DeskEvent) {
        if let Err(err) = self.reporter.report(event) {
            warn!(error = %err, "failed to report desk event");
        }
    }
}

impl<R> std::fmt::Debug for Desk<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .field("entropy", &self.entropy.source_id())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::ConsoleReporter;

    fn fast_config() -> DeskConfig {
        DeskConfig::new()
            .with_seed(17)
            .with_unit_millis(5)
            .with_max_offset(4)
            .with_interval(0, 1)
    }

    #[test]
    fn bounded_run_delivers_every_call() {
        let config = fast_config().with_max_guests(5);
        let mut desk = Desk::new(config, ConsoleReporter::new(Vec::new(), true)).unwrap();
        let summary = desk.run().unwrap();

        assert_eq!(summary.guests, 5);
        assert_eq!(summary.registered, 5);
        assert_eq!(summary.delivered, 5);
        assert_eq!(summary.final_counts.expired, 5);
        assert_eq!(summary.final_counts.pending, 0);
        assert!(!summary.interrupted);

        let out = String::from_utf8(desk.into_reporter().into_inner()).unwrap();
        assert_eq!(out.lines().filter(|l| l.contains("\"woke\"")).count(), 5);
        assert!(out.lines().last().unwrap().contains("\"shutdown\""));
    }

    #[test]
    fn full_desk_rejects_guests() {
        let config = fast_config().with_capacity(1).with_max_guests(2);
        let mut desk = Desk::new(config, ConsoleReporter::new(Vec::new(), false)).unwrap();
        let far = Deadline::now().saturating_add(Duration::from_secs(3_600));
        desk.coordinator()
            .register_alarm(&crate::cancel::CancelToken::new(), far)
            .unwrap();

        let stop = desk.stop_flag();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            stop.store(true, Ordering::Release);
        });
        let summary = desk.run().unwrap();
        stopper.join().unwrap();

        assert_eq!(summary.guests, 2);
        assert_eq!(summary.registered, 0);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.delivered, 0);
        assert!(summary.interrupted);
        assert_eq!(summary.final_counts, AlarmCounts::default());

        let out = String::from_utf8(desk.into_reporter().into_inner()).unwrap();
        assert_eq!(out.matches("Rejected:").count(), 2);
    }

    #[test]
    fn raised_stop_flag_shuts_down_immediately() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut desk = Desk::new(fast_config(), ConsoleReporter::new(Vec::new(), false))
            .unwrap()
            .with_stop_flag(Arc::clone(&stop));
        let summary = desk.run().unwrap();
        assert_eq!(summary.guests, 0);
        assert!(summary.interrupted);
        assert!(desk.coordinator().is_shutdown());
    }

    #[test]
    fn failed_session_still_shuts_down() {
        let mut desk = Desk::new(fast_config(), ConsoleReporter::new(Vec::new(), false)).unwrap();
        let far = Deadline::now().saturating_add(Duration::from_secs(3_600));
        desk.coordinator()
            .register_alarm(&crate::cancel::CancelToken::new(), far)
            .unwrap();
        desk.ensure_waiter().unwrap();
        assert!(desk.waiter.is_some());

        let err = desk.close(Err(Error::TaskPanicked("guest"))).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::TaskPanicked);
        assert!(desk.waiter.is_none());
        assert!(desk.coordinator().is_shutdown());
        assert!(!desk.coordinator().is_locked());
        assert_eq!(desk.coordinator().current_counts().pending, 0);

        let out = String::from_utf8(desk.into_reporter().into_inner()).unwrap();
        assert!(out.contains("The waiter thread says goodbye."));
    }

    #[test]
    fn invalid_config_is_refused() {
        let err = Desk::new(
            DeskConfig::new().with_capacity(0),
            ConsoleReporter::new(Vec::new(), false),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
