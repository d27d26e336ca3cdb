//! Cell text normalization.
//!
//! Spreadsheets arrive with Arabic-Indic digits, thousands separators,
//! non-breaking spaces and invisible direction marks mixed into numbers.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Characters dropped from numeric and account-number cells.
const INVISIBLE: [char; 7] = [
    ' ', '\u{00A0}', '\u{200F}', '\u{200E}', '\u{202A}', '\u{202B}', '\u{202C}',
];

/// Maps Arabic-Indic and Extended Arabic-Indic digits to ASCII.
#[must_use]
pub fn ascii_digit(c: char) -> char {
    match c {
        '\u{0660}'..='\u{0669}' => shift_digit(c, 0x0660),
        '\u{06F0}'..='\u{06F9}' => shift_digit(c, 0x06F0),
        _ => c,
    }
}

fn shift_digit(c: char, zero: u32) -> char {
    char::from_u32(u32::from(c) - zero + u32::from(b'0')).unwrap_or(c)
}

/// Normalizes a bank account number: strips spaces and direction marks,
/// maps digits to ASCII.
#[must_use]
pub fn normalize_bank_account(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .map(ascii_digit)
        .collect()
}

fn clean_number(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !INVISIBLE.contains(c) && *c != ',' && *c != '\u{066C}')
        .map(|c| if c == '\u{066B}' { '.' } else { ascii_digit(c) })
        .collect()
}

fn parse_decimal(cleaned: &str) -> Option<Decimal> {
    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

/// Parses the profile base salary leniently.
///
/// Blank, negative and unparsable values all mean "absent".
#[must_use]
pub fn parse_base_salary(raw: &str) -> Option<Decimal> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return None;
    }
    parse_decimal(&cleaned).filter(|d| !d.is_sign_negative())
}

/// Parses a statement line item. A blank cell is zero; `None` means the
/// cell holds something that is not a number.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    parse_decimal(&cleaned).map(|d| d.round_dp(2))
}
