//! Desk configuration.
//!
//! Defaults reproduce the classic desk: 100 alarm slots, rooms `0..9999`,
//! wake-ups up to 100 seconds out, and a new guest every 1 to 5 seconds.
//!
//! With the `config-file` feature the same settings load from TOML:
//!
//! ```toml
//! capacity = 100
//! room_count = 9999
//! max_offset = 100
//! min_interval = 1
//! max_interval = 5
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "config-file")]
use std::path::{Path, PathBuf};

/// Errors produced while loading or validating a [`DeskConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The alarm heap needs at least one slot.
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    /// Room numbers are drawn from `0..room_count`.
    #[error("room_count must be at least 1")]
    ZeroRooms,
    /// Offsets are drawn from `0..max_offset`.
    #[error("max_offset must be at least 1")]
    ZeroOffset,
    /// The time unit must be positive.
    #[error("unit_millis must be at least 1")]
    ZeroUnit,
    /// The guest interval range is empty.
    #[error("invalid guest interval: min {min} > max {max}")]
    InvalidInterval {
        /// Lower bound in units.
        min: u64,
        /// Upper bound in units.
        max: u64,
    },
    /// The config file could not be read.
    #[cfg(feature = "config-file")]
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`DeskConfig`].
    #[cfg(feature = "config-file")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the desk simulation.
///
/// Offsets and intervals are counted in units of `unit_millis` milliseconds,
/// one second by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    /// Maximum number of alarms held at once.
    pub capacity: usize,
    /// Room numbers are drawn from `0..room_count`.
    pub room_count: u32,
    /// Wake-up offsets are drawn from `0..max_offset` units after now.
    pub max_offset: u64,
    /// Shortest pause between a guest and the following waiter.
    pub min_interval: u64,
    /// Longest pause between a guest and the following waiter.
    pub max_interval: u64,
    /// Length of one unit in milliseconds.
    pub unit_millis: u64,
    /// Seed for reproducible sessions; OS entropy when absent.
    pub seed: Option<u64>,
    /// Stop after this many guests; run until interrupted when absent.
    pub max_guests: Option<u64>,
    /// Emit reports as JSON lines instead of the console layout.
    pub json: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            capacity: crate::alarm::DEFAULT_CAPACITY,
            room_count: 9999,
            max_offset: 100,
            min_interval: 1,
            max_interval: 5,
            unit_millis: 1_000,
            seed: None,
            max_guests: None,
            json: false,
        }
    }
}

impl DeskConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alarm capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the seed for reproducible sessions.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stops the session after `count` guests.
    #[must_use]
    pub const fn with_max_guests(mut self, count: u64) -> Self {
        self.max_guests = Some(count);
        self
    }

    /// Sets the range of wake-up offsets, in units.
    #[must_use]
    pub const fn with_max_offset(mut self, max_offset: u64) -> Self {
        self.max_offset = max_offset;
        self
    }

    /// Sets the guest interval range, in units.
    #[must_use]
    pub const fn with_interval(mut self, min: u64, max: u64) -> Self {
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    /// Sets the unit length in milliseconds.
    #[must_use]
    pub const fn with_unit_millis(mut self, unit_millis: u64) -> Self {
        self.unit_millis = unit_millis;
        self
    }

    /// Switches reports to JSON lines.
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Returns the length of `units` units.
    #[must_use]
    pub fn units(&self, units: u64) -> Duration {
        Duration::from_millis(units.saturating_mul(self.unit_millis))
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.room_count == 0 {
            return Err(ConfigError::ZeroRooms);
        }
        if self.max_offset == 0 {
            return Err(ConfigError::ZeroOffset);
        }
        if self.unit_millis == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        if self.min_interval > self.max_interval {
            return Err(ConfigError::InvalidInterval {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
