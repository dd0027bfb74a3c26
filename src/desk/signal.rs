//! Interrupt handling for the desk.
//!
//! SIGINT and SIGTERM raise a shared flag; the desk polls it between pause
//! slices and shuts down cleanly instead of dying mid-registration.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Signals that end a desk session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopSignal {
    /// SIGINT - Interrupt from keyboard (Ctrl+C).
    Interrupt,
    /// SIGTERM - Termination signal.
    Terminate,
}

impl StopSignal {
    /// Every signal the desk listens for.
    pub const ALL: [Self; 2] = [Self::Interrupt, Self::Terminate];

    /// Returns the raw signal number.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Interrupt => signal_hook::consts::SIGINT,
            Self::Terminate => signal_hook::consts::SIGTERM,
        }
    }

    /// Returns the conventional signal name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Installs handlers that set the returned flag on SIGINT or SIGTERM.
pub fn install_interrupt_handler() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    install_on(&flag)?;
    Ok(flag)
}

/// Wires SIGINT and SIGTERM to an existing flag.
pub fn install_on(flag: &Arc<AtomicBool>) -> io::Result<()> {
    for signal in StopSignal::ALL {
        signal_hook::flag::register(signal.as_raw(), Arc::clone(flag))?;
        crate::tracing_compat::debug!(signal = signal.name(), "stop handler installed");
    }
    Ok(())
}
