use std::collections::BTreeMap;
use std::sync::RwLock;

use kiemke_core::SessionDate;
use kiemke_inventory::{InventoryLineItem, InventorySession};

use super::{SessionStore, StoreError, upsert_lines};

/// In-memory session store.
///
/// Intended for tests/dev. Lines keep their insertion order within a session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<BTreeMap<SessionDate, InventorySession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with complete sessions, merging sessions that share a date.
    pub fn with_sessions(sessions: impl IntoIterator<Item = InventorySession>) -> Self {
        let mut map: BTreeMap<SessionDate, InventorySession> = BTreeMap::new();
        for session in sessions {
            let entry = map
                .entry(session.date)
                .or_insert_with(|| InventorySession::empty(session.date));
            upsert_lines(entry, session.items);
        }
        Self {
            sessions: RwLock::new(map),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, date: SessionDate, items: Vec<InventoryLineItem>) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        let session = sessions
            .entry(date)
            .or_insert_with(|| InventorySession::empty(date));

        let incoming = items.len();
        let replaced = upsert_lines(session, items);
        tracing::debug!(date = %date, incoming, replaced, "session saved");
        Ok(())
    }

    fn load(&self, date: SessionDate) -> Result<Option<InventorySession>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.get(&date).cloned())
    }

    fn list_dates(&self) -> Result<Vec<SessionDate>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.keys().copied().collect())
    }
}
