//! Stock-count ("kiểm kê") domain module.
//!
//! This crate contains the inventory snapshot model and the session comparer,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod compare;
pub mod item;
pub mod remediation;
pub mod session;

pub use compare::{
    ChangeType, CompareResult, CompareSummary, Comparison, compare_chronological, compare_sessions,
};
pub use item::InventoryLineItem;
pub use remediation::{RemediationBatch, build_remediation_batch};
pub use session::InventorySession;
