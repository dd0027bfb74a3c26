//! Unit-test helpers: logging setup and phase/assertion macros.
//!
//! Integration tests carry their own copy in `tests/common`.

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer tracing subscriber once per process.
///
/// The filter comes from `RUST_LOG`, defaulting to `wakedesk=debug`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wakedesk=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Logs the start of a named test phase.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        ::tracing::info!(phase = %$name, "========================================");
    };
}

/// Logs successful completion of a named test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        ::tracing::info!(test = %$name, "test completed");
    };
}

/// Asserts a condition, logging expected and actual values first.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let ok = $cond;
        ::tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            ok,
            "{}",
            $msg
        );
        assert!(ok, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    }};
}
