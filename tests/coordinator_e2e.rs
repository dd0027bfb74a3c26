//! E2E: guests and a waiter racing on one coordinator.

#![allow(missing_docs)]

#[macro_use]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use wakedesk::desk::{GuestTask, WaiterTask};
use wakedesk::{
    AlarmCounts, AlarmOutcome, AlarmRegistry, CancelReason, CancelToken, ErrorKind,
    SchedulerCoordinator, WaiterState,
};

fn init_test(name: &str) {
    common::init_test_logging();
    test_phase!(name);
}

fn wait_until_armed(coordinator: &SchedulerCoordinator) {
    let start = Instant::now();
    while coordinator.awaiting().is_none() {
        assert!(start.elapsed() < Duration::from_secs(5), "waiter never armed");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn e2e_concurrent_guests_keep_counters_consistent() {
    init_test("e2e_concurrent_guests_keep_counters_consistent");
    let coordinator = Arc::new(SchedulerCoordinator::new(32));

    test_section!("Spawn 48 guests against 32 slots");
    let guests: Vec<_> = (0..48_u64)
        .map(|i| GuestTask::spawn(Arc::clone(&coordinator), common::in_millis(i % 7)).unwrap())
        .collect();
    let mut accepted = 0_usize;
    let mut rejected = 0_usize;
    for guest in guests {
        match guest.join() {
            Ok(()) => accepted += 1,
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
                rejected += 1;
            }
        }
    }
    assert_with_log!(accepted == 32, "accepted fills capacity", 32, accepted);
    assert_with_log!(rejected == 16, "overflow rejected", 16, rejected);
    assert!(coordinator.inspect(AlarmRegistry::is_consistent));

    test_section!("Drain with successive waiters");
    let mut previous = None;
    for delivered in 1..=32 {
        let outcome = WaiterTask::spawn(Arc::clone(&coordinator))
            .unwrap()
            .join()
            .unwrap();
        let report = *outcome.report().expect("alarm delivered");
        assert!(previous.is_none_or(|p| report.wake_time >= p));
        previous = Some(report.wake_time);
        assert_eq!(report.expired, delivered);
        assert_eq!(report.pending, 32 - delivered);
    }
    assert_eq!(
        coordinator.current_counts(),
        AlarmCounts {
            pending: 0,
            expired: 32
        }
    );
    test_complete!("e2e_concurrent_guests_keep_counters_consistent");
}

#[test]
fn e2e_repeated_preemption_delivers_the_earliest() {
    init_test("e2e_repeated_preemption_delivers_the_earliest");
    let coordinator = Arc::new(SchedulerCoordinator::new(8));
    let token = CancelToken::new();
    coordinator
        .register_alarm(&token, common::in_millis(8_000))
        .unwrap();

    let waiter = WaiterTask::spawn(Arc::clone(&coordinator)).unwrap();
    wait_until_armed(&coordinator);

    test_section!("Each guest moves the deadline earlier");
    let mut earliest = None;
    for offset in [4_000, 2_000, 1_000, 60] {
        let deadline = common::in_millis(offset);
        coordinator.register_alarm(&token, deadline).unwrap();
        earliest = Some(deadline);
        let start = Instant::now();
        while coordinator.awaiting() != Some(deadline) && !waiter.is_finished() {
            assert!(start.elapsed() < Duration::from_secs(5));
            thread::sleep(Duration::from_millis(1));
        }
    }

    let outcome = waiter.join().unwrap();
    let delivered = outcome.report().map(|r| r.wake_time);
    assert_with_log!(
        delivered == earliest,
        "earliest deadline delivered",
        earliest,
        delivered
    );
    assert_eq!(coordinator.current_counts().pending, 4);
    test_complete!("e2e_repeated_preemption_delivers_the_earliest");
}

#[test]
fn e2e_cancelled_waiter_leaves_state_untouched() {
    init_test("e2e_cancelled_waiter_leaves_state_untouched");
    let coordinator = Arc::new(SchedulerCoordinator::new(4));
    coordinator
        .register_alarm(&CancelToken::new(), common::in_millis(30_000))
        .unwrap();

    let waiter = WaiterTask::spawn(Arc::clone(&coordinator)).unwrap();
    wait_until_armed(&coordinator);
    waiter.cancel(CancelReason::user("guest checked out"));

    let state = WaiterTask::final_state(waiter.join()).unwrap();
    assert_with_log!(
        state == WaiterState::Cancelled,
        "waiter ends cancelled",
        WaiterState::Cancelled,
        state
    );
    assert!(!coordinator.is_locked());
    assert_eq!(coordinator.waiter_state(), WaiterState::Idle);
    assert_eq!(
        coordinator.current_counts(),
        AlarmCounts {
            pending: 1,
            expired: 0
        }
    );

    test_section!("A fresh waiter can still be cancelled by shutdown");
    let waiter = WaiterTask::spawn(Arc::clone(&coordinator)).unwrap();
    wait_until_armed(&coordinator);
    let counts = coordinator.request_shutdown(CancelReason::shutdown());
    assert_eq!(counts.pending, 0);
    let err = waiter.join().unwrap_err();
    assert!(err.cancel_reason().is_some_and(CancelReason::is_shutdown));
    test_complete!("e2e_cancelled_waiter_leaves_state_untouched");
}

#[test]
fn e2e_waiter_with_nothing_pending_finishes_idle() {
    init_test("e2e_waiter_with_nothing_pending_finishes_idle");
    let coordinator = Arc::new(SchedulerCoordinator::new(4));
    let outcome = WaiterTask::spawn(Arc::clone(&coordinator))
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(outcome, AlarmOutcome::NoAlarmsPending);
    test_complete!("e2e_waiter_with_nothing_pending_finishes_idle");
}
