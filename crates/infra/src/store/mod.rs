//! Session persistence boundary.
//!
//! A store keeps one [`InventorySession`] per date. Saving is an upsert keyed
//! by [`LineItemKey`]: lines whose code already exists on that date are
//! replaced in place, new codes are appended, and lines not in the batch are
//! left untouched.

pub mod in_memory;
pub mod json_dir;

pub use in_memory::InMemorySessionStore;
pub use json_dir::JsonDirSessionStore;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use kiemke_core::{LineItemKey, SessionDate};
use kiemke_inventory::{InventoryLineItem, InventorySession};

/// Session store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed session file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Dated stock-count sessions.
pub trait SessionStore: Send + Sync {
    /// Upsert `items` into the session dated `date`, creating it if needed.
    fn save(&self, date: SessionDate, items: Vec<InventoryLineItem>) -> Result<(), StoreError>;

    fn load(&self, date: SessionDate) -> Result<Option<InventorySession>, StoreError>;

    /// Dates with a stored session, oldest first.
    fn list_dates(&self) -> Result<Vec<SessionDate>, StoreError>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn save(&self, date: SessionDate, items: Vec<InventoryLineItem>) -> Result<(), StoreError> {
        (**self).save(date, items)
    }

    fn load(&self, date: SessionDate) -> Result<Option<InventorySession>, StoreError> {
        (**self).load(date)
    }

    fn list_dates(&self) -> Result<Vec<SessionDate>, StoreError> {
        (**self).list_dates()
    }
}

/// Merge `items` into `session` by line key. Returns how many lines were replaced.
pub(crate) fn upsert_lines(session: &mut InventorySession, items: Vec<InventoryLineItem>) -> usize {
    let mut replaced = 0;

    for item in items {
        let key = LineItemKey::new(session.date, item.item_code.clone());
        match session
            .items
            .iter_mut()
            .find(|existing| existing.item_code == key.code)
        {
            Some(existing) => {
                tracing::trace!(line = %key, "replacing stored line");
                *existing = item;
                replaced += 1;
            }
            None => session.items.push(item),
        }
    }

    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_date() -> SessionDate {
        SessionDate::from_ymd(2024, 7, 1).unwrap()
    }

    #[test]
    fn upsert_replaces_in_place_and_appends() {
        let mut session = InventorySession::new(
            test_date(),
            vec![
                InventoryLineItem::new("A", "Xi măng").with_quantity(dec!(1)),
                InventoryLineItem::new("B", "Cát").with_quantity(dec!(2)),
            ],
        );

        let replaced = upsert_lines(
            &mut session,
            vec![
                InventoryLineItem::new("a", "Xi măng PCB40").with_quantity(dec!(0)),
                InventoryLineItem::new("C", "Đá").with_quantity(dec!(3)),
            ],
        );

        assert_eq!(replaced, 1);
        let codes: Vec<&str> = session.items.iter().map(|i| i.item_code.as_str()).collect();
        assert_eq!(codes, vec!["a", "B", "C"]);
        assert_eq!(session.items[0].item_name, "Xi măng PCB40");
        assert_eq!(session.items[0].quantity, dec!(0));
        assert_eq!(session.items[1].quantity, dec!(2));
    }

    #[test]
    fn arc_store_delegates() {
        let store = Arc::new(InMemorySessionStore::new());
        let shared: Arc<dyn SessionStore> = store.clone();

        shared
            .save(test_date(), vec![InventoryLineItem::new("A", "Xi măng")])
            .unwrap();

        assert_eq!(store.list_dates().unwrap(), vec![test_date()]);
        assert_eq!(shared.load(test_date()).unwrap().unwrap().len(), 1);
    }
}
