//! Integration tests for the stock-count pipeline.
//!
//! Tests: Store → Compare → Remediation batch → Store
//!
//! Verifies:
//! - Remediated sessions compare as expected against the originals
//! - The file-backed store behaves like the in-memory one
//! - Session loads through a coordinator hit the store once

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kiemke_core::SessionDate;
    use kiemke_inventory::{ChangeType, InventoryLineItem, InventorySession, compare_chronological};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::remediation::remediate_out_of_stock;
    use crate::requests::RequestCoordinator;
    use crate::store::{InMemorySessionStore, JsonDirSessionStore, SessionStore};

    fn test_date(day: u32) -> SessionDate {
        SessionDate::from_ymd(2024, 11, day).unwrap()
    }

    fn seed(store: &dyn SessionStore) {
        store
            .save(
                test_date(1),
                vec![
                    InventoryLineItem::new("VT-01", "Xi măng").with_quantity(dec!(10)),
                    InventoryLineItem::new("VT-02", "Thép").with_quantity(dec!(4)),
                    InventoryLineItem::new("VT-03", "Cát").with_quantity(dec!(8)),
                ],
            )
            .unwrap();
        store
            .save(
                test_date(30),
                vec![
                    InventoryLineItem::new("vt-01", "Xi măng").with_quantity(dec!(12)),
                    InventoryLineItem::new("VT-04", "Đá").with_quantity(dec!(1)),
                ],
            )
            .unwrap();
    }

    fn run_pipeline(store: &dyn SessionStore) {
        seed(store);

        let older = store.load(test_date(1)).unwrap().unwrap();
        let newer = store.load(test_date(30)).unwrap().unwrap();
        let before = compare_chronological(&older, &newer);
        assert_eq!(before.summary.count(ChangeType::OutOfStock), 2);

        let batch = remediate_out_of_stock(store, test_date(1), test_date(30), test_date(30)).unwrap();
        assert_eq!(batch.len(), 2);

        // The remediated newer session now carries the missing items at zero.
        let remediated = store.load(test_date(30)).unwrap().unwrap();
        let after = compare_chronological(&older, &remediated);
        assert_eq!(after.summary.count(ChangeType::OutOfStock), 0);
        assert_eq!(after.summary.count(ChangeType::Decreased), 2);
        assert_eq!(after.results.len(), before.results.len());
        assert_eq!(remediated.find(&"VT-02".into()).unwrap().quantity, Decimal::ZERO);

        assert_eq!(store.list_dates().unwrap(), vec![test_date(1), test_date(30)]);
    }

    #[test]
    fn pipeline_in_memory() {
        run_pipeline(&InMemorySessionStore::new());
    }

    #[test]
    fn pipeline_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        run_pipeline(&JsonDirSessionStore::new(dir.path()));
    }

    #[test]
    fn coordinated_loads_hit_store_once() {
        let store = Arc::new(InMemorySessionStore::new());
        seed(store.as_ref());
        let coordinator: RequestCoordinator<SessionDate, InventorySession> = RequestCoordinator::new();
        let loads = AtomicUsize::new(0);

        let fetch = |date: &SessionDate| -> Result<InventorySession, String> {
            loads.fetch_add(1, Ordering::SeqCst);
            store
                .load(*date)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("no session for {date}"))
        };

        let first = coordinator.get_or_load(test_date(1), fetch).unwrap();
        let second = coordinator.get_or_load(test_date(1), fetch).unwrap();
        assert_eq!(first, second);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(coordinator.get_or_load(test_date(2), fetch).is_none());
    }
}
