//! Optional tracing integration.
//!
//! With the `tracing-integration` feature enabled these macros forward to the
//! [`tracing`] crate. Without it they expand to nothing, so call sites never
//! need their own `cfg` guards.
//!
//! ```ignore
//! use crate::tracing_compat::debug;
//!
//! debug!(deadline = %target, "waiter re-armed");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    /// No-op stand-in for `tracing::trace!`.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __wakedesk_noop_trace {
        ($($arg:tt)*) => {{}};
    }

    /// No-op stand-in for `tracing::debug!`.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __wakedesk_noop_debug {
        ($($arg:tt)*) => {{}};
    }

    /// No-op stand-in for `tracing::info!`.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __wakedesk_noop_info {
        ($($arg:tt)*) => {{}};
    }

    /// No-op stand-in for `tracing::warn!`.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __wakedesk_noop_warn {
        ($($arg:tt)*) => {{}};
    }

    /// No-op stand-in for `tracing::error!`.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __wakedesk_noop_error {
        ($($arg:tt)*) => {{}};
    }
}

#[cfg(not(feature = "tracing-integration"))]
pub use crate::{
    __wakedesk_noop_debug as debug, __wakedesk_noop_error as error, __wakedesk_noop_info as info,
    __wakedesk_noop_trace as trace, __wakedesk_noop_warn as warn,
};
