//! Cooperative cancellation tokens.
//!
//! Cancellation is request-then-observe. [`CancelToken::cancel`] records the
//! request and wakes every registered [`Waker`]; a task notices it at a
//! [`checkpoint`](CancelToken::checkpoint) or inside the coordinator's wait
//! loop. Checkpoints sit where no lock is held, so a cancelled task always
//! unwinds with the coordinator lock free and the alarm heap untouched by
//! half-finished work.
//!
//! # Example
//!
//! ```
//! use wakedesk::cancel::CancelToken;
//! use wakedesk::types::CancelReason;
//!
//! let token = CancelToken::new();
//! assert!(token.checkpoint().is_ok());
//!
//! token.cancel(CancelReason::shutdown());
//! let err = token.checkpoint().unwrap_err();
//! assert!(err.is_cancelled());
//! ```

use crate::error::{Error, Result};
use crate::types::CancelReason;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::Waker;

#[derive(Debug, Default)]
struct CancelState {
    requested: AtomicBool,
    reason: Mutex<Option<CancelReason>>,
    wakers: Mutex<Vec<(u64, Waker)>>,
    next_waker: AtomicU64,
}

/// A shared cancellation flag with an attached reason.
///
/// Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Creates a token with no cancellation requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes every registered waker.
    ///
    /// A later request only replaces the stored reason if it is more severe.
    /// Returns `true` if this call changed the token's state.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        let mut slot = self.state.reason.lock();
        let changed = match slot.as_mut() {
            Some(current) => current.strengthen(&reason),
            None => {
                *slot = Some(reason);
                true
            }
        };
        self.state.requested.store(true, Ordering::Release);
        drop(slot);

        // Wake outside the list lock: a waker may take other locks.
        let wakers: Vec<Waker> = self
            .state
            .wakers
            .lock()
            .iter()
            .map(|(_, waker)| waker.clone())
            .collect();
        for waker in wakers {
            waker.wake();
        }
        changed
    }

    /// Registers `waker` to be woken when cancellation is requested.
    ///
    /// The waker stays registered until the returned guard is dropped. A
    /// caller that registers and then checks [`is_cancelled`](Self::is_cancelled)
    /// never misses a request: either the check sees it or the waker fires.
    #[must_use = "dropping the registration unregisters the waker"]
    pub fn register_waker(&self, waker: &Waker) -> WakerRegistration {
        let id = self.state.next_waker.fetch_add(1, Ordering::Relaxed);
        self.state.wakers.lock().push((id, waker.clone()));
        WakerRegistration {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.requested.load(Ordering::Acquire)
    }

    /// Returns the recorded cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        self.state.reason.lock().clone()
    }

    /// Fails with [`Error::Cancelled`] if cancellation has been requested.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled(self.reason().unwrap_or_default()));
        }
        Ok(())
    }

    /// Returns true if both handles share the same state.
    #[must_use]
    pub fn same_token(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Keeps a waker registered on a [`CancelToken`]; unregisters on drop.
#[derive(Debug)]
pub struct WakerRegistration {
    state: Arc<CancelState>,
    id: u64,
}

impl Drop for WakerRegistration {
    fn drop(&mut self) {
        self.state.wakers.lock().retain(|(id, _)| *id != self.id);
    }
}
