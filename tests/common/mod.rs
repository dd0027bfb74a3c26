//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;
use wakedesk::{Deadline, DeskConfig};

static INIT_LOGGING: Once = Once::new();

pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wakedesk=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A deadline `millis` milliseconds from now.
pub fn in_millis(millis: u64) -> Deadline {
    Deadline::now().saturating_add(Duration::from_millis(millis))
}

/// A seeded config with 5 ms units, small offsets, and short pauses.
pub fn fast_config(seed: u64) -> DeskConfig {
    DeskConfig::new()
        .with_seed(seed)
        .with_unit_millis(5)
        .with_max_offset(6)
        .with_interval(0, 2)
}

#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
    };
}

#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "---");
    };
}

#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed");
    };
}

#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let ok = $cond;
        tracing::debug!(expected = ?$expected, actual = ?$actual, ok, "{}", $msg);
        assert!(ok, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    }};
}
