//! Session comparer: per-item diff of two stock-count snapshots.
//!
//! Given an older and a newer session, every item code present in either one
//! yields exactly one [`CompareResult`]. Results are ordered by
//! [`ChangeType::priority`] and, within a change type, by the order codes were
//! first seen (older session first, then codes only in the newer one).

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kiemke_core::{ItemCode, SessionDate};

use crate::item::InventoryLineItem;
use crate::session::InventorySession;

/// Classification of one item between two sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Present in the older session, absent from the newer one.
    OutOfStock,
    /// Absent from the older session, present in the newer one.
    NewItem,
    Decreased,
    Increased,
    Unchanged,
}

impl ChangeType {
    /// All variants in result order.
    pub const ALL: [ChangeType; 5] = [
        ChangeType::OutOfStock,
        ChangeType::NewItem,
        ChangeType::Decreased,
        ChangeType::Increased,
        ChangeType::Unchanged,
    ];

    /// Sort rank: lower comes first.
    pub fn priority(self) -> u8 {
        match self {
            ChangeType::OutOfStock => 0,
            ChangeType::NewItem => 1,
            ChangeType::Decreased => 2,
            ChangeType::Increased => 3,
            ChangeType::Unchanged => 4,
        }
    }

    /// Label shown on the comparison sheet.
    pub fn label_vi(self) -> &'static str {
        match self {
            ChangeType::OutOfStock => "Hết hàng",
            ChangeType::NewItem => "Mới",
            ChangeType::Decreased => "Giảm",
            ChangeType::Increased => "Tăng",
            ChangeType::Unchanged => "Không đổi",
        }
    }

    fn from_difference(difference: Decimal) -> Self {
        if difference > Decimal::ZERO {
            ChangeType::Increased
        } else if difference < Decimal::ZERO {
            ChangeType::Decreased
        } else {
            ChangeType::Unchanged
        }
    }
}

impl core::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ChangeType::OutOfStock => "out_of_stock",
            ChangeType::NewItem => "new_item",
            ChangeType::Decreased => "decreased",
            ChangeType::Increased => "increased",
            ChangeType::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

/// Diff of one item code between two sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResult {
    pub item_code: ItemCode,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// `None` when the item is absent from the older session.
    pub quantity_in_session1: Option<Decimal>,
    /// `None` when the item is absent from the newer session.
    pub quantity_in_session2: Option<Decimal>,
    pub change_type: ChangeType,
    /// Signed `newer - older`; an absent side counts as zero.
    pub difference: Decimal,
}

impl CompareResult {
    pub fn is_out_of_stock(&self) -> bool {
        self.change_type == ChangeType::OutOfStock
    }
}

/// Compare two sessions that the caller has already put in chronological order.
///
/// Pure and re-entrant: inputs are not mutated and no state is kept between calls.
/// When a session repeats an item code, its first line is used.
pub fn compare_sessions(older: &InventorySession, newer: &InventorySession) -> Vec<CompareResult> {
    if older.date > newer.date {
        tracing::warn!(
            older = %older.date,
            newer = %newer.date,
            "sessions passed out of chronological order; comparing as given"
        );
    }

    let older_index = index_by_code(older);
    let newer_index = index_by_code(newer);
    let codes = union_codes(older, newer);

    let mut results = Vec::with_capacity(codes.len());
    for code in codes {
        let before = older_index.get(code.key()).copied();
        let after = newer_index.get(code.key()).copied();

        let (change_type, difference) = match (before, after) {
            (Some(b), None) => (ChangeType::OutOfStock, -b.quantity),
            (None, Some(a)) => (ChangeType::NewItem, a.quantity),
            (Some(b), Some(a)) => {
                let difference = checked_difference(code, a.quantity, b.quantity);
                (ChangeType::from_difference(difference), difference)
            }
            (None, None) => {
                // Unreachable: every code comes from one of the two indexes.
                tracing::error!(item_code = %code, "item code missing from both sessions; skipped");
                continue;
            }
        };

        results.push(build_result(code, before, after, change_type, difference));
    }

    // `sort_by_key` is stable: ties keep encounter order.
    results.sort_by_key(|r| r.change_type.priority());

    tracing::debug!(
        older = %older.date,
        newer = %newer.date,
        items = results.len(),
        "sessions compared"
    );

    results
}

/// `newer - older`, clamped to the `Decimal` range.
fn checked_difference(code: &ItemCode, newer: Decimal, older: Decimal) -> Decimal {
    newer.checked_sub(older).unwrap_or_else(|| {
        tracing::warn!(item_code = %code, "quantity difference overflows; clamped");
        newer.saturating_sub(older)
    })
}

/// First occurrence of each code wins.
fn index_by_code(session: &InventorySession) -> HashMap<&str, &InventoryLineItem> {
    let mut index: HashMap<&str, &InventoryLineItem> = HashMap::with_capacity(session.items.len());
    for item in &session.items {
        let key = item.item_code.key();
        if index.contains_key(key) {
            tracing::debug!(
                date = %session.date,
                item_code = %item.item_code,
                "duplicate item code ignored; first line wins"
            );
            continue;
        }
        index.insert(key, item);
    }
    index
}

fn union_codes<'a>(older: &'a InventorySession, newer: &'a InventorySession) -> Vec<&'a ItemCode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut codes = Vec::new();
    for item in older.items.iter().chain(newer.items.iter()) {
        if seen.insert(item.item_code.key()) {
            codes.push(&item.item_code);
        }
    }
    codes
}

fn build_result(
    code: &ItemCode,
    before: Option<&InventoryLineItem>,
    after: Option<&InventoryLineItem>,
    change_type: ChangeType,
    difference: Decimal,
) -> CompareResult {
    let pick = |f: fn(&InventoryLineItem) -> Option<&String>| {
        after.and_then(f).or_else(|| before.and_then(f)).cloned()
    };

    CompareResult {
        item_code: after.map(|i| &i.item_code).unwrap_or(code).clone(),
        item_name: pick(|i| Some(&i.item_name).filter(|n| !n.is_empty())).unwrap_or_default(),
        group_name: pick(|i| i.group_name.as_ref()),
        unit: pick(|i| i.unit.as_ref()),
        quantity_in_session1: before.map(|i| i.quantity),
        quantity_in_session2: after.map(|i| i.quantity),
        change_type,
        difference,
    }
}

/// Per-change-type counts over a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareSummary {
    pub total_items: usize,
    pub out_of_stock: usize,
    pub new_items: usize,
    pub decreased: usize,
    pub increased: usize,
    pub unchanged: usize,
    /// Sum of all signed differences, clamped to the `Decimal` range.
    pub net_difference: Decimal,
}

impl CompareSummary {
    pub fn from_results(results: &[CompareResult]) -> Self {
        let mut summary = Self {
            total_items: results.len(),
            ..Self::default()
        };

        for r in results {
            match r.change_type {
                ChangeType::OutOfStock => summary.out_of_stock += 1,
                ChangeType::NewItem => summary.new_items += 1,
                ChangeType::Decreased => summary.decreased += 1,
                ChangeType::Increased => summary.increased += 1,
                ChangeType::Unchanged => summary.unchanged += 1,
            }
            let net = summary.net_difference;
            summary.net_difference = net.checked_add(r.difference).unwrap_or_else(|| {
                tracing::warn!("net difference overflows; clamped");
                net.saturating_add(r.difference)
            });
        }

        summary
    }

    pub fn count(&self, change_type: ChangeType) -> usize {
        match change_type {
            ChangeType::OutOfStock => self.out_of_stock,
            ChangeType::NewItem => self.new_items,
            ChangeType::Decreased => self.decreased,
            ChangeType::Increased => self.increased,
            ChangeType::Unchanged => self.unchanged,
        }
    }

    /// True when every item is unchanged.
    pub fn is_stable(&self) -> bool {
        self.unchanged == self.total_items
    }
}

/// Comparison of two sessions after ordering them by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub older_date: SessionDate,
    pub newer_date: SessionDate,
    pub results: Vec<CompareResult>,
    pub summary: CompareSummary,
}

/// Compare two sessions in either order.
///
/// The earlier-dated session is treated as the older one. On equal dates, `a`
/// is treated as older.
pub fn compare_chronological(a: &InventorySession, b: &InventorySession) -> Comparison {
    let (older, newer) = if b.date < a.date { (b, a) } else { (a, b) };
    let results = compare_sessions(older, newer);
    let summary = CompareSummary::from_results(&results);

    Comparison {
        older_date: older.date,
        newer_date: newer.date,
        results,
        summary,
    }
}
