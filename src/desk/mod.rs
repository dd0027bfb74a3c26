//! The hotel front desk.
//!
//! - [`guest`]: Random guests and their requested wake-up times
//! - [`task`]: Guest and waiter threads with cancellation handles
//! - [`report`]: Desk events and the console printout
//! - [`simulation`]: The session loop tying it together
//! - [`signal`]: SIGINT/SIGTERM wiring for the stop flag

pub mod guest;
pub mod report;
#[cfg(unix)]
pub mod signal;
pub mod simulation;
pub mod task;

pub use guest::Guest;
pub use report::{ConsoleReporter, DeskEvent, DeskReporter, format_ctime};
#[cfg(unix)]
pub use signal::{StopSignal, install_interrupt_handler};
pub use simulation::{Desk, DeskSummary};
pub use task::{GuestTask, TaskHandle, WaiterTask};
