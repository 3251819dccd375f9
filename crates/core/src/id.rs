//! Business identifiers used across the stock-count domain.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Item code (MaVT): the business identifier of a stock-keeping unit.
///
/// The original spelling is kept for display; identity is case-insensitive and
/// ignores surrounding whitespace, so `"vt-01"` and `" VT-01 "` are the same item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemCode {
    raw: String,
    key: String,
}

impl ItemCode {
    /// Build a code without validation. Empty codes are representable.
    pub fn new(code: impl AsRef<str>) -> Self {
        let raw = code.as_ref().trim().to_string();
        let key = raw.to_lowercase();
        Self { raw, key }
    }

    /// Build a code, rejecting blank input.
    pub fn parse(code: &str) -> DomainResult<Self> {
        let code = Self::new(code);
        if code.is_empty() {
            return Err(DomainError::validation("item code cannot be empty"));
        }
        Ok(code)
    }

    /// Spelling as entered (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Case-folded identity key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl PartialEq for ItemCode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ItemCode {}

impl Hash for ItemCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ItemCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for ItemCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ItemCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ItemCode> for String {
    fn from(value: ItemCode) -> Self {
        value.raw
    }
}

/// Date label of a stock-count session.
///
/// Ordered chronologically. Displays in the Vietnamese `dd/mm/yyyy` form and
/// serializes as ISO `yyyy-mm-dd`; both forms are accepted on input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionDate(NaiveDate);

/// Accepted input layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

impl SessionDate {
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DomainError::validation(format!("invalid date {year}-{month}-{day}")))
    }

    /// Today's date in the local timezone (the date a remediation batch is filed under).
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn parse(label: &str) -> DomainResult<Self> {
        let label = label.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
            .map(Self)
            .ok_or_else(|| DomainError::validation(format!("unrecognized session date: {label:?}")))
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// `yyyy-mm-dd`, used for storage keys and file names.
    pub fn to_iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl ValueObject for SessionDate {}

impl core::fmt::Display for SessionDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.0.day(), self.0.month(), self.0.year())
    }
}

impl FromStr for SessionDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionDate> for String {
    fn from(value: SessionDate) -> Self {
        value.to_iso()
    }
}

/// Composite storage id of one counted line: session date + item code.
///
/// Saving a session upserts by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineItemKey {
    pub date: SessionDate,
    pub code: ItemCode,
}

impl LineItemKey {
    pub fn new(date: SessionDate, code: ItemCode) -> Self {
        Self { date, code }
    }
}

impl core::fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}", self.date.to_iso(), self.code.key())
    }
}
