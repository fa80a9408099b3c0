//! Session snapshot persistence
//!
//! Bridges the live [`SessionState`] to a [`StateStore`]. Every write and
//! read is best-effort: a failing store is logged and the session simply
//! continues memory-only.

use std::sync::Arc;

use tracing::warn;

use crate::session::state::SessionState;
use crate::storage::StateStore;

/// Storage key for the last session snapshot.
const SESSION_STATE_KEY: &str = "session:last-state:v1";

/// Mirrors session state changes into durable storage.
pub struct PersistenceBridge {
    store: Arc<dyn StateStore>,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load the previously persisted snapshot, if any.
    ///
    /// The result always comes back neutralized: whatever the snapshot
    /// claims, the restored session is not loading, not streaming, and
    /// carries no error. An absent, unreadable, or corrupt snapshot yields
    /// the default state.
    pub fn hydrate(&self) -> SessionState {
        let raw = match self.store.get(SESSION_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionState::default(),
            Err(err) => {
                warn!(error = %err, "failed to read session snapshot, starting fresh");
                return SessionState::default();
            }
        };

        match serde_json::from_str::<SessionState>(&raw) {
            Ok(snapshot) => snapshot.neutralized(),
            Err(err) => {
                warn!(error = %err, "ignoring corrupt session snapshot");
                SessionState::default()
            }
        }
    }

    /// Write the current state to storage, neutralized.
    pub fn persist(&self, state: &SessionState) {
        let snapshot = state.neutralized();
        let raw = match serde_json::to_string(&snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to serialize session snapshot");
                return;
            }
        };

        if let Err(err) = self.store.put(SESSION_STATE_KEY, &raw) {
            warn!(error = %err, "failed to write session snapshot");
        }
    }

    /// Delete the persisted snapshot.
    pub fn purge(&self) {
        if let Err(err) = self.store.delete(SESSION_STATE_KEY) {
            warn!(error = %err, "failed to delete session snapshot");
        }
    }
}
