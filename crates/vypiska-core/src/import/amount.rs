//! Amount normalization
//!
//! Bank exports write money as locale-formatted text ("1 234,56", "−150,50",
//! "+99") or as native numeric cells. Both roads lead to an exact
//! [`Decimal`]; no amount ever passes through float arithmetic.

use rust_decimal::Decimal;

/// Normalize a locale-formatted amount string into an exact decimal
///
/// Strips non-breaking and ordinary spaces, drops explicit "+" markers, maps
/// the typographic minus to ASCII, and converts a comma decimal separator to
/// a dot. Empty or unparseable input yields zero so one malformed row cannot
/// abort a whole import; callers that must reject such rows check for a zero
/// result themselves.
pub fn normalize_amount(raw: &str) -> Decimal {
    let cleaned = raw
        .trim()
        .replace(['\u{a0}', ' '], "")
        .replace('+', "")
        .replace('−', "-")
        .replace(',', ".");

    cleaned.parse().unwrap_or(Decimal::ZERO)
}

/// Convert a native numeric cell value into an exact decimal
///
/// Goes through the value's shortest string form rather than binary float
/// arithmetic, so `580.64` stays `580.64`.
pub fn decimal_from_f64(value: f64) -> Decimal {
    value.to_string().parse().unwrap_or(Decimal::ZERO)
}
