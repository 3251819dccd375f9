//! Per-instance load tracking keyed by query identity.
//!
//! Each coordinator owns its own state, so two independent views never see
//! each other's loading flags. A load for a key that is already in flight is
//! not started again.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<V> {
    Idle,
    Loading,
    Ready(V),
    Failed(String),
}

impl<V> LoadState<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Permission to run one load. Hand it back through [`RequestCoordinator::finish`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket<K> {
    key: K,
    generation: u64,
}

impl<K> LoadTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[derive(Debug)]
struct Slot<V> {
    state: LoadState<V>,
    generation: u64,
}

#[derive(Debug)]
pub struct RequestCoordinator<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for RequestCoordinator<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> RequestCoordinator<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &K) -> LoadState<V> {
        self.slots
            .lock()
            .ok()
            .and_then(|slots| slots.get(key).map(|slot| slot.state.clone()))
            .unwrap_or(LoadState::Idle)
    }

    pub fn is_loading(&self, key: &K) -> bool {
        self.state(key).is_loading()
    }

    /// Mark `key` as loading. `None` when a load for it is already in flight.
    pub fn begin(&self, key: K) -> Option<LoadTicket<K>> {
        let mut slots = self.slots.lock().ok()?;
        let slot = slots.entry(key.clone()).or_insert(Slot {
            state: LoadState::Idle,
            generation: 0,
        });

        if slot.state.is_loading() {
            tracing::debug!("load already in flight; request deduplicated");
            return None;
        }

        slot.generation += 1;
        slot.state = LoadState::Loading;
        Some(LoadTicket {
            key,
            generation: slot.generation,
        })
    }

    /// Record the outcome of a load. Returns `false` when the ticket is stale
    /// (the key was invalidated while loading) and the outcome was dropped.
    pub fn finish<E: Display>(&self, ticket: LoadTicket<K>, outcome: Result<V, E>) -> bool {
        let Ok(mut slots) = self.slots.lock() else {
            return false;
        };
        let Some(slot) = slots.get_mut(&ticket.key) else {
            return false;
        };
        if slot.generation != ticket.generation || !slot.state.is_loading() {
            tracing::debug!(generation = ticket.generation, "stale load result dropped");
            return false;
        }

        slot.state = match outcome {
            Ok(value) => LoadState::Ready(value),
            Err(err) => {
                tracing::warn!(error = %err, "load failed");
                LoadState::Failed(err.to_string())
            }
        };
        true
    }

    /// Forget the cached state for `key`. An in-flight load's result will be ignored.
    pub fn invalidate(&self, key: &K) {
        if let Ok(mut slots) = self.slots.lock() {
            if let Some(slot) = slots.get_mut(key) {
                slot.generation += 1;
                slot.state = LoadState::Idle;
            }
        }
    }

    /// Return the ready value, or load it with `fetch` if nothing is cached or in flight.
    ///
    /// `None` means another caller is already loading this key, or the load failed.
    pub fn get_or_load<E, F>(&self, key: K, fetch: F) -> Option<V>
    where
        E: Display,
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let LoadState::Ready(value) = self.state(&key) {
            return Some(value);
        }

        let ticket = self.begin(key)?;
        let outcome = fetch(ticket.key());
        let value = outcome.as_ref().ok().cloned();
        self.finish(ticket, outcome).then_some(value).flatten()
    }
}
