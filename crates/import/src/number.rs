//! Locale-aware number parsing for spreadsheet cells.
//!
//! Rules, applied in order:
//! 1. Whitespace (including no-break spaces) and currency markers
//!    (`₫`, `đ`, `VND`, `VNĐ`) are dropped.
//! 2. Nothing left: [`NumberParseError::Empty`].
//! 3. A leading `-`/`+` or accounting parentheses `(123)` give the sign.
//! 4. Both `.` and `,` present: the right-most one is the decimal point, the
//!    other groups thousands (`1.234,5` and `1,234.5` are both 1234.5).
//! 5. One separator kind occurring several times: it groups thousands.
//! 6. A single separator followed by exactly three digits, with a non-zero
//!    integer part of one to three digits, groups thousands (`1.500` = 1500,
//!    `2,000` = 2000). A wider integer part cannot be a leading thousands
//!    group, so `1234.567` stays 1234.567.
//! 7. Any other single separator is the decimal point (`12,5`, `0.500`).
//! 8. When [`NumberFormat::implied_decimals`] is set and the cell had no
//!    separator at all, the value is divided by 10^n. Some exports write
//!    prices with two implied decimals (`150000` meaning 1500.00).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NumberParseError;

/// Per-sheet number conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Implied decimal places for separator-less cells (rule 8).
    pub implied_decimals: Option<u32>,
}

impl NumberFormat {
    pub fn with_implied_decimals(mut self, places: u32) -> Self {
        self.implied_decimals = Some(places);
        self
    }
}

const CURRENCY_MARKERS: &[&str] = &["vnđ", "vnd", "₫", "đ"];

pub fn parse_locale_number(text: &str, format: &NumberFormat) -> Result<Decimal, NumberParseError> {
    let cleaned = strip_noise(text);
    if cleaned.is_empty() {
        return Err(NumberParseError::Empty);
    }

    let (negative, body) = split_sign(&cleaned);
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(invalid(text));
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid(text));
    }

    let has_separator = body.contains(['.', ',']);
    let normalized = normalize_separators(body).ok_or_else(|| invalid(text))?;

    let mut value = Decimal::from_str(&normalized)
        .map_err(|_| NumberParseError::OutOfRange(text.trim().to_string()))?;

    if let (false, Some(places)) = (has_separator, format.implied_decimals) {
        let divisor = 10i64
            .checked_pow(places)
            .ok_or_else(|| NumberParseError::OutOfRange(text.trim().to_string()))?;
        value = value
            .checked_div(Decimal::from(divisor))
            .ok_or_else(|| NumberParseError::OutOfRange(text.trim().to_string()))?;
    }

    Ok(if negative { -value } else { value })
}

fn invalid(text: &str) -> NumberParseError {
    NumberParseError::Invalid(text.trim().to_string())
}

fn strip_noise(text: &str) -> String {
    let mut s: String = text.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
    for marker in CURRENCY_MARKERS {
        s = s.replace(marker, "");
    }
    s
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        return (true, inner);
    }
    if let Some(rest) = s.strip_prefix('-') {
        return (true, rest);
    }
    (false, s.strip_prefix('+').unwrap_or(s))
}

/// Rewrite `body` (digits and separators only) into `Decimal::from_str` form.
fn normalize_separators(body: &str) -> Option<String> {
    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    let (integer, fraction) = match (dots, commas) {
        (0, 0) => return Some(body.to_string()),
        (d, c) if d > 0 && c > 0 => {
            let split = body.rfind(['.', ','])?;
            let decimal_sep = body[split..].chars().next()?;
            let (int_part, frac_part) = (&body[..split], &body[split + 1..]);
            let grouping = if decimal_sep == '.' { ',' } else { '.' };
            if int_part.contains(decimal_sep) || frac_part.contains(grouping) {
                return None;
            }
            (ungroup(int_part, grouping)?, Some(frac_part))
        }
        (n, 0) | (0, n) => {
            let sep = if dots > 0 { '.' } else { ',' };
            if n > 1 {
                (ungroup(body, sep)?, None)
            } else {
                let (int_part, frac_part) = body.split_once(sep)?;
                let grouped = frac_part.len() == 3
                    && (1..=3).contains(&int_part.len())
                    && !int_part.trim_start_matches('0').is_empty();
                if grouped {
                    (format!("{int_part}{frac_part}"), None)
                } else {
                    (int_part.to_string(), Some(frac_part))
                }
            }
        }
        _ => return None,
    };

    let integer = if integer.is_empty() { "0".to_string() } else { integer };
    match fraction {
        Some(f) if !f.is_empty() => Some(format!("{integer}.{f}")),
        Some(_) => None,
        None => Some(integer),
    }
}

/// Remove thousands separators, checking the 1-3 then 3,3,... group shape.
fn ungroup(part: &str, sep: char) -> Option<String> {
    let mut groups = part.split(sep);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn parse(text: &str) -> Result<Decimal, NumberParseError> {
        parse_locale_number(text, &NumberFormat::default())
    }

    #[test]
    fn plain_integers_and_signs() {
        assert_eq!(parse("42").unwrap(), dec!(42));
        assert_eq!(parse(" -7 ").unwrap(), dec!(-7));
        assert_eq!(parse("+3").unwrap(), dec!(3));
        assert_eq!(parse("(1.500)").unwrap(), dec!(-1500));
    }

    #[test]
    fn vietnamese_grouping_and_decimal_comma() {
        assert_eq!(parse("1.234.567").unwrap(), dec!(1234567));
        assert_eq!(parse("1.234.567,89").unwrap(), dec!(1234567.89));
        assert_eq!(parse("12,5").unwrap(), dec!(12.5));
        assert_eq!(parse("1.500").unwrap(), dec!(1500));
    }

    #[test]
    fn english_grouping_and_decimal_point() {
        assert_eq!(parse("1,234,567.89").unwrap(), dec!(1234567.89));
        assert_eq!(parse("2,000").unwrap(), dec!(2000));
        assert_eq!(parse("3.75").unwrap(), dec!(3.75));
    }

    #[test]
    fn leading_zero_single_separator_is_decimal() {
        assert_eq!(parse("0.500").unwrap(), dec!(0.5));
        assert_eq!(parse("0,125").unwrap(), dec!(0.125));
        assert_eq!(parse(".5").unwrap(), dec!(0.5));
    }

    #[test]
    fn wide_integer_part_keeps_three_digit_fraction() {
        assert_eq!(parse("1234.567").unwrap(), dec!(1234.567));
        assert_eq!(parse("12345,678").unwrap(), dec!(12345.678));
        assert_eq!(parse("999.999").unwrap(), dec!(999999));
        assert_eq!(parse("1234.56").unwrap(), dec!(1234.56));
    }

    #[test]
    fn currency_markers_and_spaces_are_ignored() {
        assert_eq!(parse("95.000 ₫").unwrap(), dec!(95000));
        assert_eq!(parse("1 200 000 VNĐ").unwrap(), dec!(1200000));
        assert_eq!(parse("18.000đ").unwrap(), dec!(18000));
        assert_eq!(parse("1\u{a0}250").unwrap(), dec!(1250));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(parse("   ").unwrap_err(), NumberParseError::Empty);
        assert_eq!(parse("₫").unwrap_err(), NumberParseError::Empty);
        assert!(matches!(parse("abc"), Err(NumberParseError::Invalid(_))));
        assert!(matches!(parse("1.2.3"), Err(NumberParseError::Invalid(_))));
        assert!(matches!(parse("1,23.4,5"), Err(NumberParseError::Invalid(_))));
        assert!(matches!(parse("12,"), Err(NumberParseError::Invalid(_))));
        assert!(matches!(parse("-"), Err(NumberParseError::Invalid(_))));
    }

    #[test]
    fn implied_decimals_apply_only_without_separators() {
        let format = NumberFormat::default().with_implied_decimals(2);
        assert_eq!(parse_locale_number("150000", &format).unwrap(), dec!(1500));
        assert_eq!(parse_locale_number("150.000", &format).unwrap(), dec!(150000));
        assert_eq!(parse_locale_number("12,5", &format).unwrap(), dec!(12.5));
    }

    proptest! {
        /// Property: Vietnamese-formatted integers parse back to themselves.
        #[test]
        fn grouped_integers_round_trip(n in 0u64..10_000_000_000u64) {
            let digits = n.to_string();
            let mut grouped = String::new();
            for (i, c) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push('.');
                }
                grouped.push(c);
            }
            prop_assert_eq!(parse(&grouped).unwrap(), Decimal::from(n));
        }
    }
}
