//! Optimistic local mutations with recorded inverses.
//!
//! A mutation is applied to the local table before the remote store confirms
//! it. The value it overwrote is kept until the mutation is committed; on
//! failure the table is put back exactly as it was for that key.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of one pending optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(pub Uuid);

impl MutationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MutationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<K, V> {
    Upsert { key: K, value: V },
    Delete { key: K },
}

impl<K, V> Mutation<K, V> {
    pub fn key(&self) -> &K {
        match self {
            Mutation::Upsert { key, .. } | Mutation::Delete { key } => key,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("no row with key {0}")]
    NotFound(String),

    #[error("key {0} already has a pending mutation")]
    Pending(String),

    #[error("unknown mutation {0}")]
    UnknownMutation(MutationId),

    #[error("remote store rejected the change: {0}")]
    Remote(String),

    #[error("table lock poisoned")]
    LockPoisoned,
}

#[derive(Debug)]
struct Inverse<K, V> {
    key: K,
    previous: Option<V>,
}

#[derive(Debug)]
struct TableState<K, V> {
    rows: HashMap<K, V>,
    pending: HashMap<MutationId, Inverse<K, V>>,
}

/// Local copy of a remote table that accepts speculative edits.
///
/// At most one mutation per key may be pending at a time, so each rollback
/// restores a well-defined previous value.
#[derive(Debug)]
pub struct OptimisticTable<K, V> {
    state: RwLock<TableState<K, V>>,
}

impl<K, V> Default for OptimisticTable<K, V> {
    fn default() -> Self {
        Self {
            state: RwLock::new(TableState {
                rows: HashMap::new(),
                pending: HashMap::new(),
            }),
        }
    }
}

impl<K, V> OptimisticTable<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = (K, V)>) -> Self {
        let table = Self::default();
        if let Ok(mut state) = table.state.write() {
            state.rows.extend(rows);
        }
        table
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let state = self.state.read().ok()?;
        state.rows.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_count(&self) -> usize {
        self.state.read().map(|s| s.pending.len()).unwrap_or(0)
    }

    /// Apply `mutation` locally and remember how to undo it.
    pub fn begin(&self, mutation: Mutation<K, V>) -> Result<MutationId, MutationError> {
        let mut state = self.state.write().map_err(|_| MutationError::LockPoisoned)?;

        let key = mutation.key().clone();
        if state.pending.values().any(|inv| inv.key == key) {
            return Err(MutationError::Pending(format!("{key:?}")));
        }

        let previous = match mutation {
            Mutation::Upsert { key, value } => state.rows.insert(key, value),
            Mutation::Delete { key } => match state.rows.remove(&key) {
                Some(previous) => Some(previous),
                None => return Err(MutationError::NotFound(format!("{key:?}"))),
            },
        };

        let id = MutationId::new();
        state.pending.insert(id, Inverse { key, previous });
        tracing::debug!(mutation_id = %id, "optimistic mutation applied");
        Ok(id)
    }

    /// The remote store accepted the change; forget the inverse.
    pub fn commit(&self, id: MutationId) -> Result<(), MutationError> {
        let mut state = self.state.write().map_err(|_| MutationError::LockPoisoned)?;
        state
            .pending
            .remove(&id)
            .map(|_| ())
            .ok_or(MutationError::UnknownMutation(id))
    }

    /// Undo the change recorded under `id`.
    pub fn rollback(&self, id: MutationId) -> Result<(), MutationError> {
        let mut state = self.state.write().map_err(|_| MutationError::LockPoisoned)?;
        let inverse = state
            .pending
            .remove(&id)
            .ok_or(MutationError::UnknownMutation(id))?;

        match inverse.previous {
            Some(previous) => {
                state.rows.insert(inverse.key, previous);
            }
            None => {
                state.rows.remove(&inverse.key);
            }
        }

        tracing::debug!(mutation_id = %id, "optimistic mutation rolled back");
        Ok(())
    }

    /// Apply `mutation` locally, run `remote`, then commit or roll back.
    pub fn execute<T, E, F>(&self, mutation: Mutation<K, V>, remote: F) -> Result<T, MutationError>
    where
        E: Display,
        F: FnOnce(&Mutation<K, V>) -> Result<T, E>,
    {
        let request = mutation.clone();
        let id = self.begin(mutation)?;

        match remote(&request) {
            Ok(value) => {
                self.commit(id)?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(mutation_id = %id, error = %err, "remote mutation failed; rolling back");
                self.rollback(id)?;
                Err(MutationError::Remote(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiemke_core::ItemCode;
    use kiemke_inventory::InventoryLineItem;
    use rust_decimal_macros::dec;

    fn test_table() -> OptimisticTable<ItemCode, InventoryLineItem> {
        OptimisticTable::from_rows([(
            ItemCode::new("A"),
            InventoryLineItem::new("A", "Xi măng").with_quantity(dec!(10)),
        )])
    }

    #[test]
    fn rollback_restores_overwritten_row() {
        let table = test_table();
        let id = table
            .begin(Mutation::Upsert {
                key: ItemCode::new("A"),
                value: InventoryLineItem::new("A", "Xi măng").with_quantity(dec!(0)),
            })
            .unwrap();
        assert_eq!(table.get(&ItemCode::new("a")).unwrap().quantity, dec!(0));

        table.rollback(id).unwrap();
        assert_eq!(table.get(&ItemCode::new("A")).unwrap().quantity, dec!(10));
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn rollback_of_insert_removes_row() {
        let table = test_table();
        let id = table
            .begin(Mutation::Upsert {
                key: ItemCode::new("B"),
                value: InventoryLineItem::new("B", "Cát"),
            })
            .unwrap();
        assert_eq!(table.len(), 2);

        table.rollback(id).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(&ItemCode::new("B")).is_none());
    }

    #[test]
    fn rollback_of_delete_reinstates_row() {
        let table = test_table();
        let id = table.begin(Mutation::Delete { key: ItemCode::new("A") }).unwrap();
        assert!(table.is_empty());

        table.rollback(id).unwrap();
        assert_eq!(table.get(&ItemCode::new("A")).unwrap().item_name, "Xi măng");
    }

    #[test]
    fn commit_keeps_change_and_forgets_inverse() {
        let table = test_table();
        let id = table.begin(Mutation::Delete { key: ItemCode::new("A") }).unwrap();
        table.commit(id).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.rollback(id).unwrap_err(), MutationError::UnknownMutation(id));
    }

    #[test]
    fn second_pending_mutation_on_same_key_is_rejected() {
        let table = test_table();
        table.begin(Mutation::Delete { key: ItemCode::new("A") }).unwrap();

        let err = table
            .begin(Mutation::Upsert {
                key: ItemCode::new("A"),
                value: InventoryLineItem::new("A", "Xi măng"),
            })
            .unwrap_err();
        match err {
            MutationError::Pending(_) => {}
            other => panic!("Expected Pending, got {other:?}"),
        }
    }

    #[test]
    fn delete_of_missing_row_fails() {
        let table = test_table();
        match table.begin(Mutation::Delete { key: ItemCode::new("Z") }).unwrap_err() {
            MutationError::NotFound(_) => {}
            other => panic!("Expected NotFound, got {other:?}"),
        }
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn execute_rolls_back_on_remote_failure() {
        let table = test_table();

        let err = table
            .execute(Mutation::Delete { key: ItemCode::new("A") }, |_| {
                Err::<(), _>("network unreachable")
            })
            .unwrap_err();

        assert_eq!(err, MutationError::Remote("network unreachable".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn execute_commits_on_remote_success() {
        let table = test_table();

        let seen = table
            .execute(
                Mutation::Upsert {
                    key: ItemCode::new("B"),
                    value: InventoryLineItem::new("B", "Cát").with_quantity(dec!(2)),
                },
                |m| Ok::<_, String>(m.key().to_string()),
            )
            .unwrap();

        assert_eq!(seen, "B");
        assert_eq!(table.get(&ItemCode::new("B")).unwrap().quantity, dec!(2));
        assert_eq!(table.pending_count(), 0);
    }
}
