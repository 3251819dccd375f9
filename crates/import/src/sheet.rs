//! Rows of cell text → one stock-count session.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kiemke_core::{ItemCode, SessionDate};
use kiemke_inventory::{InventoryLineItem, InventorySession};

use crate::error::{ImportError, NumberParseError};
use crate::header::{ColumnMapping, ImportField};
use crate::number::{NumberFormat, parse_locale_number};

/// How many leading rows may hold titles before the header row.
const HEADER_SCAN_ROWS: usize = 10;

/// Problem found on one sheet row. Rows are numbered from 1 like in a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: usize,
    #[serde(flatten)]
    pub kind: RowIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RowIssueKind {
    /// Row skipped: no item code.
    MissingCode,
    /// Row skipped: the code already appeared earlier on the sheet.
    DuplicateCode { code: String, first_row: usize },
    /// Row kept with the field left empty (quantity falls back to zero).
    InvalidNumber {
        field: ImportField,
        value: String,
        reason: String,
    },
}

/// Outcome of importing one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub session: InventorySession,
    pub issues: Vec<RowIssue>,
    /// 1-based row number of the detected header.
    pub header_row: usize,
    pub mapping: ColumnMapping,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.session.len()
    }

    pub fn skipped(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| !matches!(i.kind, RowIssueKind::InvalidNumber { .. }))
            .count()
    }
}

/// Import a sheet given as rows of cell text.
///
/// `format` applies to the unit price and line total columns; quantities are
/// always read without implied decimals.
///
/// The header row is the first row (among the first few) whose headers resolve
/// to a [`ColumnMapping`]; rows above it are treated as titles. Blank rows are
/// ignored. Per-row problems are collected as [`RowIssue`]s rather than
/// failing the whole import.
pub fn import_rows<R: AsRef<[String]>>(
    rows: &[R],
    date: SessionDate,
    format: &NumberFormat,
) -> Result<ImportReport, ImportError> {
    let (header_idx, mapping) = find_header(rows)?;

    let mut session = InventorySession::empty(date);
    let mut issues = Vec::new();
    let mut first_rows: HashMap<ItemCode, usize> = HashMap::new();

    for (idx, row) in rows.iter().enumerate().skip(header_idx + 1) {
        let row_no = idx + 1;
        let cells = row.as_ref();
        if is_blank(cells) {
            continue;
        }

        let cell = |field: ImportField| {
            mapping
                .column(field)
                .and_then(|col| cells.get(col))
                .map(|s| s.trim())
                .unwrap_or("")
        };

        let code = ItemCode::new(cell(ImportField::ItemCode));
        if code.is_empty() {
            issues.push(RowIssue { row: row_no, kind: RowIssueKind::MissingCode });
            continue;
        }
        if let Some(&first_row) = first_rows.get(&code) {
            issues.push(RowIssue {
                row: row_no,
                kind: RowIssueKind::DuplicateCode { code: code.to_string(), first_row },
            });
            continue;
        }
        first_rows.insert(code.clone(), row_no);

        let mut number = |field: ImportField, format: &NumberFormat| -> Option<Decimal> {
            let text = cell(field);
            match parse_locale_number(text, format) {
                Ok(value) => Some(value),
                Err(NumberParseError::Empty) => None,
                Err(err) => {
                    issues.push(RowIssue {
                        row: row_no,
                        kind: RowIssueKind::InvalidNumber {
                            field,
                            value: text.to_string(),
                            reason: err.to_string(),
                        },
                    });
                    None
                }
            }
        };

        // Implied decimals only ever affect money columns.
        let quantity = number(ImportField::Quantity, &NumberFormat::default()).unwrap_or(Decimal::ZERO);
        let mut unit_price = number(ImportField::UnitPrice, format);
        let line_total = number(ImportField::LineTotal, format);

        // Some templates carry only the line total; recover the unit price from it.
        if let (None, Some(total)) = (unit_price, line_total) {
            if !quantity.is_zero() {
                unit_price = total.checked_div(quantity);
            }
        }

        let mut item = InventoryLineItem::new(code, cell(ImportField::ItemName)).with_quantity(quantity);
        item.group_name = non_empty(cell(ImportField::GroupName));
        item.unit = non_empty(cell(ImportField::Unit));
        item.origin_of_manufacture = non_empty(cell(ImportField::Origin));
        item.note = non_empty(cell(ImportField::Note));
        item.unit_price = unit_price;

        session.push(item);
    }

    tracing::info!(
        date = %date,
        imported = session.len(),
        issues = issues.len(),
        "stock-count sheet imported"
    );

    Ok(ImportReport {
        session,
        issues,
        header_row: header_idx + 1,
        mapping,
    })
}

fn find_header<R: AsRef<[String]>>(rows: &[R]) -> Result<(usize, ColumnMapping), ImportError> {
    let mut first_err = None;

    for (idx, row) in rows.iter().enumerate().take(HEADER_SCAN_ROWS) {
        let cells = row.as_ref();
        if is_blank(cells) {
            continue;
        }
        match ColumnMapping::resolve(cells) {
            Ok(mapping) => return Ok((idx, mapping)),
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }

    Err(first_err.unwrap_or(ImportError::EmptySheet))
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
