//! Desk events and console reporting.
//!
//! The console layout follows the front-desk printout: a `Register:` line per
//! guest, a `Wake up:` line per delivered call followed by the expired and
//! pending tallies, and a cleanup banner on shutdown. With JSON enabled each
//! event is one serialized line instead.

use crate::alarm::AlarmCounts;
use crate::desk::Guest;
use crate::sync::ExpiredAlarmReport;
use crate::types::Deadline;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, Write};

/// Something the desk wants reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeskEvent {
    /// A guest's wake-up call was recorded.
    Registered {
        /// The guest.
        guest: Guest,
    },
    /// A guest's wake-up call was refused.
    Rejected {
        /// The guest.
        guest: Guest,
        /// Why the registration failed.
        reason: String,
    },
    /// A wake-up call was delivered.
    Woke(ExpiredAlarmReport),
    /// The desk shut down.
    Shutdown {
        /// Counts after the pending reset.
        counts: AlarmCounts,
    },
}

/// Sink for [`DeskEvent`]s.
pub trait DeskReporter: Send {
    /// Reports one event.
    fn report(&mut self, event: &DeskEvent) -> io::Result<()>;
}

/// Formats a deadline in local time, `ctime` style (`Mon Oct 19 07:30:00 2026`).
#[must_use]
pub fn format_ctime(deadline: Deadline) -> String {
    let local: DateTime<Local> = deadline.to_system_time().into();
    local.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Writes events to a terminal-like stream.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: W,
    json: bool,
}

impl ConsoleReporter<io::Stdout> {
    /// Reports to standard output.
    #[must_use]
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Reports to `out`, as JSON lines if `json` is set.
    pub const fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_console(&mut self, event: &DeskEvent) -> io::Result<()> {
        match event {
            DeskEvent::Registered { guest } => {
                writeln!(
                    self.out,
                    "Register: {:>8} {}\n",
                    guest.room,
                    format_ctime(guest.wake_at)
                )
            }
            DeskEvent::Rejected { guest, reason } => {
                writeln!(self.out, "Rejected: {:>8} {reason}\n", guest.room)
            }
            DeskEvent::Woke(report) => {
                writeln!(
                    self.out,
                    "Wake up:{:11}{}\n",
                    "",
                    format_ctime(report.wake_time)
                )?;
                writeln!(self.out, "Expired alarms:  {}", report.expired)?;
                writeln!(self.out, "Pending alarms:  {}\n", report.pending)
            }
            DeskEvent::Shutdown { counts } => {
                writeln!(self.out, "\nThe guest thread is cleaning up...")?;
                writeln!(self.out, "The guest thread says goodbye.")?;
                writeln!(self.out, "The waiter thread is cleaning up...")?;
                writeln!(self.out, "The waiter thread says goodbye.")?;
                writeln!(self.out, "Pending alarms:{:5}{}", "", counts.pending)
            }
        }
    }
}

impl<W: Write + Send> DeskReporter for ConsoleReporter<W> {
    fn report(&mut self, event: &DeskEvent) -> io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, event)?;
            writeln!(self.out)?;
        } else {
            self.write_console(event)?;
        }
        self.out.flush()
    }
}
