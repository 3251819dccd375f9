//! Out-of-stock remediation: zero-quantity lines for items that vanished from a count.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use kiemke_core::SessionDate;

use crate::compare::CompareResult;
use crate::item::InventoryLineItem;
use crate::session::InventorySession;

/// Lines ready to be saved as (part of) the session dated `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationBatch {
    pub date: SessionDate,
    pub items: Vec<InventoryLineItem>,
}

impl RemediationBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_session(self) -> InventorySession {
        InventorySession::new(self.date, self.items)
    }
}

/// Build the zero-quantity batch for every `out_of_stock` result.
///
/// Descriptive fields are carried over from the older session's line; when the
/// line cannot be found there, the result's own display fields are used.
/// Results of any other change type are ignored, as are repeated codes.
pub fn build_remediation_batch(
    results: &[CompareResult],
    older: &InventorySession,
    target_date: SessionDate,
) -> RemediationBatch {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for result in results.iter().filter(|r| r.is_out_of_stock()) {
        if !seen.insert(result.item_code.clone()) {
            continue;
        }

        let line = match older.find(&result.item_code) {
            Some(source) => source.zeroed(),
            None => {
                tracing::debug!(
                    item_code = %result.item_code,
                    "out-of-stock item not in older session; using compare result fields"
                );
                let mut line =
                    InventoryLineItem::new(result.item_code.clone(), result.item_name.clone());
                line.group_name = result.group_name.clone();
                line.unit = result.unit.clone();
                line
            }
        };
        items.push(line);
    }

    RemediationBatch {
        date: target_date,
        items,
    }
}
