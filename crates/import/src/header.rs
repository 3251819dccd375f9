//! Header recognition for stock-count sheets.
//!
//! Sheets come from different templates ("Mã VT", "MÃ VẬT TƯ", "Ma hang"...).
//! Headers are normalized (lowercase, Vietnamese tone marks folded, punctuation
//! collapsed) and then matched against per-field aliases.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// A column the importer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    ItemCode,
    ItemName,
    GroupName,
    Unit,
    Origin,
    UnitPrice,
    Quantity,
    LineTotal,
    Note,
}

impl ImportField {
    /// Resolution order. Required fields first so they get first pick of headers.
    pub const ALL: [ImportField; 9] = [
        ImportField::ItemCode,
        ImportField::Quantity,
        ImportField::ItemName,
        ImportField::UnitPrice,
        ImportField::LineTotal,
        ImportField::GroupName,
        ImportField::Unit,
        ImportField::Origin,
        ImportField::Note,
    ];

    pub fn is_required(self) -> bool {
        matches!(self, ImportField::ItemCode | ImportField::Quantity)
    }

    /// Known header spellings, already normalized.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ImportField::ItemCode => &[
                "ma vt", "mavt", "ma vat tu", "ma hang", "ma hang hoa", "ma sp", "ma san pham",
                "item code", "code", "sku",
            ],
            ImportField::ItemName => &[
                "ten vt", "ten vat tu", "ten hang", "ten hang hoa", "ten san pham", "ten",
                "item name", "name",
            ],
            ImportField::GroupName => &["nhom", "nhom vt", "nhom vat tu", "nhom hang", "loai", "group"],
            ImportField::Unit => &["dvt", "don vi tinh", "don vi", "unit"],
            ImportField::Origin => &["xuat xu", "nguon goc", "noi san xuat", "origin"],
            ImportField::UnitPrice => &["don gia", "gia nhap", "gia von", "unit price", "price"],
            ImportField::Quantity => &[
                "so luong", "sl", "so luong thuc te", "sl thuc te", "so luong kiem ke", "sl kiem ke",
                "ton kho",
                "sl ton", "quantity", "qty",
            ],
            ImportField::LineTotal => &["thanh tien", "tong tien", "gia tri", "line total", "amount"],
            ImportField::Note => &["ghi chu", "chu thich", "note", "notes"],
        }
    }
}

impl core::fmt::Display for ImportField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ImportField::ItemCode => "Mã VT",
            ImportField::ItemName => "Tên VT",
            ImportField::GroupName => "Nhóm",
            ImportField::Unit => "ĐVT",
            ImportField::Origin => "Xuất xứ",
            ImportField::UnitPrice => "Đơn giá",
            ImportField::Quantity => "Số lượng",
            ImportField::LineTotal => "Thành tiền",
            ImportField::Note => "Ghi chú",
        };
        f.write_str(s)
    }
}

const FOLDS: &[(char, &str)] = &[
    ('a', "àáảãạăằắẳẵặâầấẩẫậ"),
    ('e', "èéẻẽẹêềếểễệ"),
    ('i', "ìíỉĩị"),
    ('o', "òóỏõọôồốổỗộơờớởỡợ"),
    ('u', "ùúủũụưừứửữự"),
    ('y', "ỳýỷỹỵ"),
    ('d', "đ"),
];

fn fold_char(c: char) -> char {
    FOLDS
        .iter()
        .find(|(_, variants)| variants.contains(c))
        .map(|(base, _)| *base)
        .unwrap_or(c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&c)
}

/// Lowercase, fold Vietnamese diacritics, keep alphanumerics separated by single spaces.
pub fn normalize_header(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.to_lowercase().chars() {
        if is_combining_mark(c) {
            continue;
        }
        let c = fold_char(c);
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Which sheet column feeds which field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: HashMap<ImportField, usize>,
}

impl ColumnMapping {
    /// Match `headers` to fields: exact alias match first, then word-level
    /// containment for multi-word aliases. Each header feeds at most one field.
    ///
    /// Containment candidates are ranked across all fields at once: the longest
    /// matched alias wins, then the one starting earliest in the header (the
    /// head noun comes first in Vietnamese, so "Giá trị tồn kho" is a value,
    /// not a quantity), then field order.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        let mut used = vec![false; normalized.len()];
        let mut columns = HashMap::new();

        for field in ImportField::ALL {
            let found = normalized
                .iter()
                .enumerate()
                .find(|(idx, header)| !used[*idx] && field.aliases().contains(&header.as_str()))
                .map(|(idx, _)| idx);
            if let Some(idx) = found {
                used[idx] = true;
                columns.insert(field, idx);
            }
        }

        while let Some((field, idx)) = best_containment(&normalized, &used, &columns) {
            tracing::debug!(%field, header = %headers[idx].as_ref(), "header matched by containment");
            used[idx] = true;
            columns.insert(field, idx);
        }

        if let Some(missing) = ImportField::ALL
            .into_iter()
            .find(|f| f.is_required() && !columns.contains_key(f))
        {
            return Err(ImportError::MissingColumn(missing));
        }

        Ok(Self { columns })
    }

    pub fn column(&self, field: ImportField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn is_mapped(&self, field: ImportField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Optional fields with no matching header.
    pub fn unmapped(&self) -> Vec<ImportField> {
        ImportField::ALL
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }
}

/// Where an alias overlaps a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overlap {
    words: usize,
    position: usize,
}

/// Longer match, earlier position, field order, header order.
type Score = (Reverse<usize>, usize, usize, usize);

/// Highest-ranked (field, header) containment match among unmapped fields and
/// unused headers.
fn best_containment(
    normalized: &[String],
    used: &[bool],
    columns: &HashMap<ImportField, usize>,
) -> Option<(ImportField, usize)> {
    let mut best: Option<(Score, ImportField, usize)> = None;

    for (rank, field) in ImportField::ALL.into_iter().enumerate() {
        if columns.contains_key(&field) {
            continue;
        }
        for (idx, header) in normalized.iter().enumerate() {
            if used[idx] {
                continue;
            }
            for alias in field.aliases() {
                let Some(overlap) = words_overlap(header, alias) else {
                    continue;
                };
                let score = (Reverse(overlap.words), overlap.position, rank, idx);
                if best.as_ref().is_none_or(|(current, _, _)| score < *current) {
                    best = Some((score, field, idx));
                }
            }
        }
    }

    best.map(|(_, field, idx)| (field, idx))
}

/// One side's words appear as a contiguous run in the other's; the shorter
/// side must have at least two words. `position` is where the run starts in
/// the header (zero when the whole header sits inside the alias).
fn words_overlap(header: &str, alias: &str) -> Option<Overlap> {
    let h: Vec<&str> = header.split(' ').filter(|w| !w.is_empty()).collect();
    let a: Vec<&str> = alias.split(' ').collect();

    if a.len() <= h.len() {
        if a.len() < 2 {
            return None;
        }
        h.windows(a.len())
            .position(|w| w == a.as_slice())
            .map(|position| Overlap { words: a.len(), position })
    } else {
        if h.len() < 2 {
            return None;
        }
        a.windows(h.len())
            .any(|w| w == h.as_slice())
            .then_some(Overlap { words: h.len(), position: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_tones_and_punctuation() {
        assert_eq!(normalize_header("  Mã VT "), "ma vt");
        assert_eq!(normalize_header("ĐƠN VỊ TÍNH"), "don vi tinh");
        assert_eq!(normalize_header("Số lượng (thực tế)"), "so luong thuc te");
        assert_eq!(normalize_header("Xuất_xứ"), "xuat xu");
    }

    #[test]
    fn normalize_drops_combining_marks() {
        // "Mã" written as 'a' + U+0303 combining tilde.
        assert_eq!(normalize_header("Ma\u{303} VT"), "ma vt");
    }

    #[test]
    fn resolves_standard_template() {
        let headers = ["STT", "Mã VT", "Tên vật tư", "ĐVT", "Đơn giá", "Số lượng", "Thành tiền", "Ghi chú"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();

        assert_eq!(mapping.column(ImportField::ItemCode), Some(1));
        assert_eq!(mapping.column(ImportField::ItemName), Some(2));
        assert_eq!(mapping.column(ImportField::Unit), Some(3));
        assert_eq!(mapping.column(ImportField::UnitPrice), Some(4));
        assert_eq!(mapping.column(ImportField::Quantity), Some(5));
        assert_eq!(mapping.column(ImportField::LineTotal), Some(6));
        assert_eq!(mapping.column(ImportField::Note), Some(7));
        assert_eq!(
            mapping.unmapped(),
            vec![ImportField::GroupName, ImportField::Origin]
        );
    }

    #[test]
    fn resolves_by_containment() {
        let headers = ["Mã vật tư (bắt buộc)", "Số lượng tồn cuối kỳ", "Nhóm hàng hóa"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();

        assert_eq!(mapping.column(ImportField::ItemCode), Some(0));
        assert_eq!(mapping.column(ImportField::Quantity), Some(1));
        assert_eq!(mapping.column(ImportField::GroupName), Some(2));
    }

    #[test]
    fn value_header_mentioning_stock_is_not_a_quantity() {
        let headers = ["Mã VT", "Giá trị tồn kho", "SL thực tế"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        assert_eq!(mapping.column(ImportField::Quantity), Some(2));
        assert_eq!(mapping.column(ImportField::LineTotal), Some(1));
    }

    #[test]
    fn containment_prefers_alias_at_head_of_header() {
        let headers = ["Mã VT", "Giá trị tồn kho", "Số lượng tồn cuối kỳ"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        assert_eq!(mapping.column(ImportField::Quantity), Some(2));
        assert_eq!(mapping.column(ImportField::LineTotal), Some(1));
    }

    #[test]
    fn header_is_used_once() {
        let headers = ["Mã VT", "SL", "SL"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        assert_eq!(mapping.column(ImportField::Quantity), Some(1));
        assert!(!mapping.is_mapped(ImportField::UnitPrice));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = ColumnMapping::resolve(&["Tên vật tư", "Số lượng"]).unwrap_err();
        assert_eq!(err, ImportError::MissingColumn(ImportField::ItemCode));

        let err = ColumnMapping::resolve(&["Mã VT", "Tên vật tư"]).unwrap_err();
        assert_eq!(err, ImportError::MissingColumn(ImportField::Quantity));
    }
}
