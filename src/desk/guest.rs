//! Randomly generated hotel guests.

use crate::config::DeskConfig;
use crate::types::Deadline;
use crate::util::EntropySource;
use serde::Serialize;

/// A guest asking for a wake-up call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guest {
    /// Room number.
    pub room: u32,
    /// Requested wake-up time.
    pub wake_at: Deadline,
}

impl Guest {
    /// Draws a guest with a random room and a wake-up time in
    /// `[now, now + max_offset)` units.
    ///
    /// With whole-second units the base time is truncated to the second, so
    /// every generated deadline is a whole second.
    pub fn random(entropy: &dyn EntropySource, config: &DeskConfig, now: Deadline) -> Self {
        let room = entropy.next_below(u64::from(config.room_count));
        let offset = entropy.next_below(config.max_offset);
        let base = if config.unit_millis % 1_000 == 0 {
            Deadline::from_unix_secs(now.as_unix_secs())
        } else {
            now
        };
        Self {
            room: u32::try_from(room).unwrap_or(u32::MAX),
            wake_at: base.saturating_add(config.units(offset)),
        }
    }
}
