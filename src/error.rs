//! Error types for the wake-up desk.
//!
//! Heap precondition failures, cancellation, and configuration problems all
//! surface through [`Error`]. Heap errors are never retried: they reject the
//! single operation that triggered them and leave the shared registry as it
//! was.

use crate::config::ConfigError;
use crate::types::CancelReason;
use thiserror::Error;

/// Precondition failures raised by the alarm heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// Insertion attempted with the heap already at capacity.
    #[error("heap capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Fixed capacity of the heap.
        capacity: usize,
    },
    /// Extraction or peek attempted on an empty heap.
    #[error("heap is empty")]
    EmptyHeap,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A registration was rejected because the heap is full.
    CapacityExceeded,
    /// Consumption was attempted with nothing pending.
    EmptyHeap,
    /// The task observed a cancellation request at a safe point.
    Cancelled,
    /// A task thread panicked.
    TaskPanicked,
    /// A task thread could not be started.
    Spawn,
    /// The desk configuration is invalid or unreadable.
    Config,
}

/// The error type for desk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Registration rejected: the alarm heap is full. The guest is not recorded.
    #[error("registration rejected: alarm capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Fixed capacity of the alarm heap.
        capacity: usize,
    },
    /// Consumption attempted with nothing pending. Indicates a coordination bug.
    #[error("no pending alarm to consume")]
    EmptyHeap,
    /// Cancellation observed at a safe point. No alarm was delivered.
    #[error("no alarm delivered, shutdown in progress ({0})")]
    Cancelled(CancelReason),
    /// A guest or waiter thread panicked.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
    /// The OS refused to start a task thread.
    #[error("failed to spawn {label} task: {source}")]
    Spawn {
        /// Which task failed to start.
        label: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::EmptyHeap => ErrorKind::EmptyHeap,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::TaskPanicked(_) => ErrorKind::TaskPanicked,
            Self::Spawn { .. } => ErrorKind::Spawn,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns true if this error is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the cancellation reason, if this is a cancellation.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<HeapError> for Error {
    fn from(err: HeapError) -> Self {
        match err {
            HeapError::CapacityExceeded { capacity } => Self::CapacityExceeded { capacity },
            HeapError::EmptyHeap => Self::EmptyHeap,
        }
    }
}

/// A specialized `Result` for desk operations.
pub type Result<T> = std::result::Result<T, Error>;
