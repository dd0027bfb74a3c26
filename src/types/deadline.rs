//! Absolute wake-up instants.
//!
//! A [`Deadline`] is a point on the wall clock, stored as milliseconds since
//! the Unix epoch. The desk registers whole seconds, but the finer storage
//! lets the coordinator wait on sub-second targets.

use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[inline]
fn duration_to_millis_saturating(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

/// An absolute wake-up instant.
///
/// Deadlines are immutable values ordered by time. Once registered they are
/// owned by the alarm heap and handed back by value on extraction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Deadline(u64);

impl Deadline {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a deadline from whole seconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000))
    }

    /// Creates a deadline from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a deadline from a [`SystemTime`].
    ///
    /// Times before the epoch clamp to [`Deadline::EPOCH`].
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        time.duration_since(UNIX_EPOCH)
            .map_or(Self::EPOCH, |since| {
                Self(duration_to_millis_saturating(since))
            })
    }

    /// Reads the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Returns the deadline as milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_unix_millis(self) -> u64 {
        self.0
    }

    /// Returns the deadline truncated to whole seconds since the Unix epoch.
    #[must_use]
    pub const fn as_unix_secs(self) -> u64 {
        self.0 / 1_000
    }

    /// Converts back to a [`SystemTime`].
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.0)
    }

    /// Returns this deadline shifted forward by `offset`, saturating at the
    /// largest representable instant.
    #[must_use]
    pub fn saturating_add(self, offset: Duration) -> Self {
        Self(self.0.saturating_add(duration_to_millis_saturating(offset)))
    }

    /// Returns how far this deadline lies after `earlier`, or zero if it does
    /// not.
    #[must_use]
    pub const fn duration_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Returns true if this deadline is at or before `now`.
    #[must_use]
    pub fn has_elapsed(self, now: Self) -> bool {
        self <= now
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0 % 1_000;
        if millis == 0 {
            write!(f, "{}s", self.as_unix_secs())
        } else {
            write!(f, "{}.{millis:03}s", self.as_unix_secs())
        }
    }
}
