//! Spreadsheet import normalization for stock-count sheets.
//!
//! Reading the binary workbook is left to the caller; this crate starts from
//! rows of cell text and turns them into an [`InventorySession`]:
//! - locale-aware number parsing (Vietnamese and English separators)
//! - fuzzy header matching (diacritic-insensitive aliases)
//! - row validation with per-row issues instead of hard failures
//!
//! [`InventorySession`]: kiemke_inventory::InventorySession

pub mod error;
pub mod header;
pub mod number;
pub mod sheet;

pub use error::{ImportError, NumberParseError};
pub use header::{ColumnMapping, ImportField, normalize_header};
pub use number::{NumberFormat, parse_locale_number};
pub use sheet::{ImportReport, RowIssue, RowIssueKind, import_rows};
