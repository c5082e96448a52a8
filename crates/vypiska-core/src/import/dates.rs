//! Date normalization
//!
//! Statement exports carry dates as numeric `DD.MM.YYYY` text, as free text
//! with an abbreviated Russian month name ("5 дек. 2025"), or as native
//! spreadsheet datetime cells. Anything that cannot be resolved to a valid
//! calendar date is `None` — the pipeline never guesses a default date.

use chrono::NaiveDate;
use regex::Regex;

/// Ordered prefix table mapping abbreviated Russian month names to month
/// numbers. Longer prefixes are listed before their 3-character forms so
/// "сент." resolves the same way "сен" does. "ма" alone would match both
/// март and май, so both full spellings of the fifth month are listed
/// instead of a shared prefix.
const MONTH_PREFIXES: &[(&str, u32)] = &[
    ("янв", 1),
    ("фев", 2),
    ("мар", 3),
    ("апр", 4),
    ("май", 5),
    ("мая", 5),
    ("июн", 6),
    ("июл", 7),
    ("авг", 8),
    ("сент", 9),
    ("сен", 9),
    ("окт", 10),
    ("ноя", 11),
    ("дек", 12),
];

fn month_from_abbrev(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    MONTH_PREFIXES
        .iter()
        .find(|(prefix, _)| token.starts_with(prefix))
        .map(|(_, month)| *month)
}

/// Parse a strict numeric `DD.MM.YYYY` date
///
/// Invalid calendar dates (31.04.2025) are `None`, not an error.
pub fn parse_dd_mm_yyyy(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()
}

/// Parse a free-text date
///
/// Tries the segment before the first comma as `DD.MM.YYYY`, then searches
/// the whole text for a "day month-abbreviation year" pattern with an
/// optional trailing period and/or comma after the month.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let lead = text.split(',').next().unwrap_or("");
    if let Some(date) = parse_dd_mm_yyyy(lead) {
        return Some(date);
    }

    let pattern =
        Regex::new(r"(\d{1,2})\s+([а-яёА-ЯЁ]+)\.?,?\s+(\d{4})").expect("valid regex");
    let caps = pattern.captures(text)?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_abbrev(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert a spreadsheet serial date using the 1899-12-30 base
pub fn from_excel_serial(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = chrono::Duration::try_days(value.floor() as i64)?;
    base.checked_add_signed(days)
}
