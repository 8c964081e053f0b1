//! Per-session concurrency control.
//!
//! Ensures only one turn runs per session at a time. A second message
//! arriving for the same session while a turn is in-flight waits for the
//! permit, so duplicate-session requests are serialized rather than
//! interleaved.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-session run locks.
///
/// Each session ID maps to a `Semaphore(1)`. Acquiring the permit ensures
/// exclusive access for one turn at a time.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the run lock for a session.
    ///
    /// Returns `Ok(permit)` when the lock is acquired (hold it for the
    /// duration of the turn, it auto-releases on drop). Waits if a turn
    /// for the same session is already running.
    pub async fn acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned().await.map_err(|_| SessionBusy)
    }

    /// Number of tracked sessions (for monitoring).
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Resolve the session ID a turn should lock on and run under.
///
/// Requests that name a session reuse that ID. Requests without one get a
/// freshly minted UUID, which becomes the new session's ID, so fresh
/// sessions never contend on a shared key.
pub fn turn_session_id(session_id: Option<&str>) -> String {
    // An empty ID counts as absent, matching the session store.
    match session_id {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

/// Error returned when a session lock cannot be acquired.
#[derive(Debug)]
pub struct SessionBusy;

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session is busy: a turn is already in progress")
    }
}

impl std::error::Error for SessionBusy {}
