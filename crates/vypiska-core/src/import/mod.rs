//! Statement import pipeline
//!
//! Each supported bank export has one parser behind the [`StatementParser`]
//! trait; [`import_statement`] dispatches on the declared [`SourceFormat`]
//! and returns the (created-count, total-amount) aggregate unchanged.
//!
//! Rows stream through the amount and date normalizers and the exclusion
//! heuristic; surviving rows are resolved against the category store and
//! persisted one record each. A malformed row is skipped with a logged
//! reason, never aborting the batch. A failed write is fatal to the import.

pub mod amount;
pub mod dates;
pub mod exclude;

mod sber;
mod tbank;

pub use exclude::ExclusionFilter;
pub use sber::SberXlsxParser;
pub use tbank::TbankCsvParser;

use std::io::{Read, Seek};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{ImportSummary, NewExpense, SourceFormat, DESCRIPTION_MAX_CHARS};

/// Why a source row was dropped without aborting the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Status field differs from the success marker
    StatusNotSuccess,
    /// Amount field empty or missing
    MissingAmount,
    /// Normalized amount is exactly zero
    ZeroAmount,
    /// Ledger rows must be outflows; this one is a top-up or refund
    NonNegativeAmount,
    /// Date field did not resolve to a valid calendar date
    UnparseableDate,
    /// Category matched the transfer/top-up exclusion list
    ExcludedCategory,
    /// Every cell in the row is empty
    EmptyRow,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusNotSuccess => "status_not_success",
            Self::MissingAmount => "missing_amount",
            Self::ZeroAmount => "zero_amount",
            Self::NonNegativeAmount => "non_negative_amount",
            Self::UnparseableDate => "unparseable_date",
            Self::ExcludedCategory => "excluded_category",
            Self::EmptyRow => "empty_row",
        }
    }
}

pub(crate) fn log_skip(row: usize, reason: SkipReason) {
    debug!(row, reason = reason.as_str(), "skipping row");
}

/// One parser for one statement export format
///
/// The set of implementations is closed over [`SourceFormat`]: supporting a
/// new bank means writing a new implementation and giving it an enum variant,
/// not touching the existing parsers.
pub trait StatementParser {
    /// Bank label stamped on every record this parser emits
    fn bank(&self) -> &'static str;

    /// Parse one uploaded export and persist every surviving row for
    /// `user_id`, returning the batch aggregate
    fn parse<R: Read + Seek>(
        &self,
        db: &Database,
        user_id: i64,
        reader: R,
    ) -> Result<ImportSummary>;
}

/// Parse an uploaded statement with the parser matching `format`
///
/// Unknown format identifiers are unrepresentable here; the caller validates
/// free-text input when constructing the [`SourceFormat`].
pub fn import_statement<R: Read + Seek>(
    db: &Database,
    user_id: i64,
    format: SourceFormat,
    reader: R,
) -> Result<ImportSummary> {
    match format {
        SourceFormat::DelimitedLedger => TbankCsvParser::default().parse(db, user_id, reader),
        SourceFormat::SpreadsheetStatement => SberXlsxParser::default().parse(db, user_id, reader),
    }
}

/// A normalized row ready for category resolution and persistence
pub(crate) struct CanonicalRow {
    pub date: NaiveDate,
    /// Positive magnitude of the expense
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub description: String,
    pub bank: &'static str,
}

/// Resolve the category and write one expense record
///
/// Applies the record invariants shared by every format: the amount is
/// rounded to two fractional digits, an empty description falls back to the
/// resolved category label, and descriptions are capped on a character
/// boundary. Returns the amount actually persisted so callers can keep their
/// running total equal to the sum over stored records. A storage error here
/// aborts the whole import.
pub(crate) fn persist_row(db: &Database, user_id: i64, row: CanonicalRow) -> Result<Decimal> {
    let category = db.get_or_create_category(user_id, &row.category)?;

    let description = if row.description.trim().is_empty() {
        category.name.clone()
    } else {
        row.description
    };
    let description: String = description.chars().take(DESCRIPTION_MAX_CHARS).collect();

    // stored with exactly two fractional digits
    let mut amount = row
        .amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);

    db.insert_expense(&NewExpense {
        user_id,
        category_id: Some(category.id),
        amount,
        date: row.date,
        description,
        bank: row.bank.to_string(),
        currency: row.currency,
    })?;

    Ok(amount)
}
