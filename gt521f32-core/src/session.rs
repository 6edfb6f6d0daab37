//! Session state for a GT521F32 module
//!
//! A session tracks:
//! - Whether OPEN has been acknowledged
//! - Firmware metadata reported by OPEN
//! - The cooperative cancellation flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::data::OpenData;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport open, OPEN not yet sent
    Idle,

    /// OPEN acknowledged, metadata cached
    Opened,

    /// Torn down
    Closed,
}

/// Session handle
///
/// Thread-safe and can be cloned cheaply (Arc internally). A clone handed
/// to another thread can cancel a finger prompt while the device itself
/// is busy polling.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Set by `cancel`, consumed by the prompt loop
    cancel: AtomicBool,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,

    /// Metadata from the last OPEN
    open_data: parking_lot::RwLock<Option<OpenData>>,
}

impl Session {
    /// Create a new idle session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                cancel: AtomicBool::new(false),
                state: parking_lot::RwLock::new(SessionState::Idle),
                open_data: parking_lot::RwLock::new(None),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if the session has been torn down
    pub fn is_closed(&self) -> bool {
        matches!(self.state(), SessionState::Closed)
    }

    /// Record the metadata returned by OPEN
    ///
    /// Re-opening an opened session refreshes the cached metadata.
    pub fn open(&self, data: OpenData) {
        *self.inner.open_data.write() = Some(data);
        *self.inner.state.write() = SessionState::Opened;
    }

    /// Metadata from the last OPEN
    pub fn open_data(&self) -> Option<OpenData> {
        self.inner.open_data.read().clone()
    }

    /// Close session
    pub fn close(&self) {
        *self.inner.state.write() = SessionState::Closed;
        self.inner.cancel.store(false, Ordering::Release);
    }

    /// Request cancellation of the current or next finger prompt
    ///
    /// Idempotent: several calls before the prompt observes the flag
    /// cancel a single prompt.
    pub fn cancel(&self) {
        self.inner.cancel.store(true, Ordering::Release);
    }

    /// Check if cancellation is pending
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::Acquire)
    }

    /// Consume a pending cancellation
    ///
    /// Returns `true` exactly once per [`cancel`](Self::cancel) burst.
    pub fn take_cancel(&self) -> bool {
        self.inner.cancel.swap(false, Ordering::AcqRel)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
