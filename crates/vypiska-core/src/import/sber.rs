//! Sberbank spreadsheet statement parser
//!
//! XLSX export where the first worksheet row is the header, whatever the
//! styling says. Columns are located by keyword match against the header
//! text because the bank renames them between export versions. Expenses are
//! usually booked positive, but some exports invert the sign; either
//! orientation is coerced to a positive magnitude. Rows in a foreign
//! currency fall back to the column already converted to the account
//! currency when it is present and populated.

use std::io::{Read, Seek};

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    amount, dates, log_skip, persist_row, CanonicalRow, ExclusionFilter, SkipReason,
    StatementParser,
};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ImportSummary, BASE_CURRENCY, UNCATEGORIZED};

/// Keyword tables binding header text to logical fields
///
/// Matching is case-insensitive substring; per field, the first unclaimed
/// header cell that contains one of its keywords wins. New header spellings
/// are additions here, not parser changes.
const DATE_KEYWORDS: &[&str] = &["дата"];
const CATEGORY_KEYWORDS: &[&str] = &["категор"];
/// Amount already converted to the account currency
const BASE_AMOUNT_KEYWORDS: &[&str] = &["в валюте счёта", "в валюте счета"];
const AMOUNT_KEYWORDS: &[&str] = &["сумма"];
const CURRENCY_KEYWORDS: &[&str] = &["валюта"];
const DESCRIPTION_KEYWORDS: &[&str] = &["описание", "назначение"];

const BANK: &str = "Sberbank";

/// Column bindings resolved from the header row
#[derive(Debug, Default, PartialEq, Eq)]
struct Columns {
    date: Option<usize>,
    category: Option<usize>,
    base_amount: Option<usize>,
    amount: Option<usize>,
    currency: Option<usize>,
    description: Option<usize>,
}

fn resolve_columns(header: &[Data]) -> Columns {
    let cells: Vec<String> = header.iter().map(|c| cell_text(c).to_lowercase()).collect();
    let mut bound = vec![false; cells.len()];

    let mut bind = |keywords: &[&str]| -> Option<usize> {
        for (idx, cell) in cells.iter().enumerate() {
            if bound[idx] || cell.is_empty() {
                continue;
            }
            if keywords.iter().any(|k| cell.contains(k)) {
                bound[idx] = true;
                return Some(idx);
            }
        }
        None
    };

    // The converted-amount header also contains the plain amount and
    // currency keywords, so it must be claimed before either of them.
    let date = bind(DATE_KEYWORDS);
    let category = bind(CATEGORY_KEYWORDS);
    let base_amount = bind(BASE_AMOUNT_KEYWORDS);
    let amount = bind(AMOUNT_KEYWORDS);
    let currency = bind(CURRENCY_KEYWORDS);
    let description = bind(DESCRIPTION_KEYWORDS);

    Columns {
        date,
        category,
        base_amount,
        amount,
        currency,
        description,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Native numeric cells convert through their string form; text cells go
/// through the shared amount normalizer. Anything unusable is zero.
fn decimal_from_cell(cell: Option<&Data>) -> Decimal {
    match cell {
        Some(Data::Float(f)) => amount::decimal_from_f64(*f),
        Some(Data::Int(i)) => Decimal::from(*i),
        Some(Data::String(s)) => amount::normalize_amount(s),
        Some(Data::Empty) | None => Decimal::ZERO,
        Some(other) => amount::normalize_amount(&other.to_string()),
    }
}

/// Structured datetime cells yield their date part directly; text cells go
/// through the date normalizer
fn date_from_cell(cell: Option<&Data>) -> Option<NaiveDate> {
    match cell? {
        Data::DateTime(dt) => dates::from_excel_serial(dt.as_f64()),
        Data::DateTimeIso(s) => {
            NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
        }
        Data::Float(f) => dates::from_excel_serial(*f),
        Data::Int(i) => dates::from_excel_serial(*i as f64),
        Data::String(s) => dates::parse_date(s),
        _ => None,
    }
}

/// Parser for the Sberbank XLSX statement export
#[derive(Debug, Default)]
pub struct SberXlsxParser {
    exclusions: ExclusionFilter,
}

impl SberXlsxParser {
    /// Replace the default transfer/top-up vocabulary
    pub fn with_exclusions(exclusions: ExclusionFilter) -> Self {
        Self { exclusions }
    }

    /// Process header and data rows
    ///
    /// Factored over a plain row iterator so the heuristics are testable
    /// without workbook fixtures.
    fn import_rows<'a, I>(&self, db: &Database, user_id: i64, mut rows: I) -> Result<ImportSummary>
    where
        I: Iterator<Item = &'a [Data]>,
    {
        let Some(header) = rows.next() else {
            return Ok(ImportSummary::default());
        };
        let columns = resolve_columns(header);

        // Date and amount are mandatory; without them nothing in the sheet
        // can be trusted, so the whole call yields the zero result.
        let (Some(date_col), Some(amount_col)) = (columns.date, columns.amount) else {
            debug!("date or amount column not found, aborting spreadsheet import");
            return Ok(ImportSummary::default());
        };

        let mut summary = ImportSummary::default();

        for (idx, row) in rows.enumerate() {
            if row.iter().all(cell_is_empty) {
                log_skip(idx, SkipReason::EmptyRow);
                continue;
            }

            let raw_amount = decimal_from_cell(row.get(amount_col));
            if raw_amount.is_zero() {
                log_skip(idx, SkipReason::ZeroAmount);
                continue;
            }
            let mut amount = raw_amount.abs();

            let Some(date) = date_from_cell(row.get(date_col)) else {
                log_skip(idx, SkipReason::UnparseableDate);
                continue;
            };

            let category = match columns.category.and_then(|i| row.get(i)) {
                Some(cell) => {
                    let text = cell_text(cell).trim().to_string();
                    if text.is_empty() {
                        UNCATEGORIZED.to_string()
                    } else {
                        text
                    }
                }
                None => UNCATEGORIZED.to_string(),
            };

            if self.exclusions.is_excluded(&category) {
                log_skip(idx, SkipReason::ExcludedCategory);
                continue;
            }

            let description = columns
                .description
                .and_then(|i| row.get(i))
                .map(|c| cell_text(c).trim().to_string())
                .unwrap_or_default();

            let mut currency = columns
                .currency
                .and_then(|i| row.get(i))
                .map(|c| cell_text(c).trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| BASE_CURRENCY.to_string());

            // Foreign-currency rows prefer the amount the bank already
            // converted to the account currency.
            if currency != BASE_CURRENCY {
                if let Some(base_col) = columns.base_amount {
                    let converted = decimal_from_cell(row.get(base_col));
                    if !converted.is_zero() {
                        amount = converted.abs();
                        currency = BASE_CURRENCY.to_string();
                    }
                }
            }

            summary.total += persist_row(
                db,
                user_id,
                CanonicalRow {
                    date,
                    amount,
                    currency,
                    category,
                    description,
                    bank: BANK,
                },
            )?;
            summary.created += 1;
        }

        Ok(summary)
    }
}

impl StatementParser for SberXlsxParser {
    fn bank(&self) -> &'static str {
        BANK
    }

    fn parse<R: Read + Seek>(
        &self,
        db: &Database,
        user_id: i64,
        reader: R,
    ) -> Result<ImportSummary> {
        let mut workbook: Xlsx<_> = Xlsx::new(reader)?;

        let sheet_names = workbook.sheet_names().to_vec();
        let Some(first_sheet) = sheet_names.first() else {
            return Ok(ImportSummary::default());
        };
        let range = workbook.worksheet_range(first_sheet)?;

        let summary = self.import_rows(db, user_id, range.rows())?;
        debug!(
            created = summary.created,
            total = %summary.total,
            "parsed Sberbank statement"
        );
        Ok(summary)
    }
}
