//! Folder session bookkeeping.
//!
//! Every folder selection starts a new session. The tracker hands out
//! monotonically increasing ids and remembers which one is current; workers
//! carry a [`SessionToken`] and stop once it goes stale, while the gallery
//! drops events tagged with anything but the current id.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared counter of the active session. Zero means no session has started.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    current: Arc<AtomicU64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session, invalidating every token handed out before.
    pub fn begin(&self) -> SessionToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        SessionToken {
            id: SessionId(id),
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> Option<SessionId> {
        match self.current.load(Ordering::SeqCst) {
            0 => None,
            id => Some(SessionId(id)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    id: SessionId,
    current: Arc<AtomicU64>,
}

impl SessionToken {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id.0
    }
}

