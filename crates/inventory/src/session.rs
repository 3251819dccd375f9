use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kiemke_core::{ItemCode, SessionDate};

use crate::item::InventoryLineItem;

/// One dated stock-count snapshot.
///
/// Item codes are expected to be unique (case-insensitive). Duplicates are
/// tolerated on read: lookups and comparisons use the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySession {
    pub date: SessionDate,
    #[serde(default)]
    pub items: Vec<InventoryLineItem>,
}

impl InventorySession {
    pub fn new(date: SessionDate, items: Vec<InventoryLineItem>) -> Self {
        Self { date, items }
    }

    pub fn empty(date: SessionDate) -> Self {
        Self::new(date, Vec::new())
    }

    pub fn push(&mut self, item: InventoryLineItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First line recorded for `code`.
    pub fn find(&self, code: &ItemCode) -> Option<&InventoryLineItem> {
        self.items.iter().find(|item| &item.item_code == code)
    }

    /// Codes that occur more than once, each reported once, in order of first repeat.
    pub fn duplicate_codes(&self) -> Vec<ItemCode> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut reported: HashSet<&str> = HashSet::new();
        let mut duplicates = Vec::new();

        for item in &self.items {
            let key = item.item_code.key();
            if !seen.insert(key) && reported.insert(key) {
                duplicates.push(item.item_code.clone());
            }
        }

        duplicates
    }

    /// `None` if the sum overflows.
    pub fn total_quantity(&self) -> Option<Decimal> {
        let total = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.quantity));
        if total.is_none() {
            tracing::warn!(date = %self.date, "total quantity overflows");
        }
        total
    }

    /// Sum of line totals (stock value on the count date). `None` on overflow.
    pub fn total_value(&self) -> Option<Decimal> {
        let total = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?));
        if total.is_none() {
            tracing::warn!(date = %self.date, "total stock value overflows");
        }
        total
    }
}
