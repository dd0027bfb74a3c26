//! Cancellation reason and kind types.
//!
//! A cancelled guest or waiter never disappears silently: it unwinds with a
//! [`CancelReason`] that says who asked and why.

use core::fmt;
use serde::Serialize;

/// The kind of cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelKind {
    /// Explicit cancellation of a single task by its owner.
    User,
    /// The whole desk is shutting down.
    Shutdown,
}

impl CancelKind {
    /// Returns the severity of this cancellation kind.
    ///
    /// Higher severity cancellations take precedence when strengthening.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Shutdown => 1,
        }
    }
}

impl fmt::Display for CancelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// The reason for a cancellation, including kind and optional context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelReason {
    /// The kind of cancellation.
    pub kind: CancelKind,
    /// Optional human-readable message.
    pub message: Option<&'static str>,
}

impl CancelReason {
    /// Creates a new cancellation reason with the given kind.
    #[must_use]
    pub const fn new(kind: CancelKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a user cancellation reason with a message.
    #[must_use]
    pub const fn user(message: &'static str) -> Self {
        Self {
            kind: CancelKind::User,
            message: Some(message),
        }
    }

    /// Creates a shutdown cancellation reason.
    #[must_use]
    pub const fn shutdown() -> Self {
        Self::new(CancelKind::Shutdown)
    }

    /// Strengthens this reason with another, keeping the more severe one.
    ///
    /// Returns `true` if the reason was changed.
    pub fn strengthen(&mut self, other: &Self) -> bool {
        if other.kind > self.kind {
            self.kind = other.kind;
            self.message = other.message;
            return true;
        }
        if other.kind == self.kind && self.message.is_none() && other.message.is_some() {
            self.message = other.message;
            return true;
        }
        false
    }

    /// Returns true if this reason indicates shutdown.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(self.kind, CancelKind::Shutdown)
    }

    /// Returns the kind of this cancellation reason.
    #[must_use]
    pub const fn kind(&self) -> CancelKind {
        self.kind
    }
}

impl Default for CancelReason {
    fn default() -> Self {
        Self::new(CancelKind::User)
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}
