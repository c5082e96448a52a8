//! T-Bank delimited ledger parser
//!
//! Semicolon-delimited CSV export with a Russian header row and, when
//! written by Windows tools, a leading byte-order marker. Only settled
//! outflows become expense records: the export books expenses as negative
//! operation amounts, so non-negative rows are top-ups or refunds and are
//! dropped.

use std::io::{Read, Seek};

use csv::ReaderBuilder;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    amount, dates, log_skip, persist_row, CanonicalRow, ExclusionFilter, SkipReason,
    StatementParser,
};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ImportSummary, BASE_CURRENCY, UNCATEGORIZED};

/// Header labels recognized in the export
const STATUS: &str = "Статус";
const OPERATION_AMOUNT: &str = "Сумма операции";
const PAYMENT_AMOUNT: &str = "Сумма платежа";
const OPERATION_CURRENCY: &str = "Валюта операции";
const OPERATION_DATE: &str = "Дата операции";
const CATEGORY: &str = "Категория";
const DESCRIPTION: &str = "Описание";

/// Rows with any other status never settled.
const STATUS_OK: &str = "OK";

const BANK: &str = "T-Bank";

/// Parser for the T-Bank CSV ledger export
#[derive(Debug, Default)]
pub struct TbankCsvParser {
    exclusions: ExclusionFilter,
}

impl TbankCsvParser {
    /// Replace the default transfer/top-up vocabulary
    pub fn with_exclusions(exclusions: ExclusionFilter) -> Self {
        Self { exclusions }
    }
}

impl StatementParser for TbankCsvParser {
    fn bank(&self) -> &'static str {
        BANK
    }

    fn parse<R: Read + Seek>(
        &self,
        db: &Database,
        user_id: i64,
        mut reader: R,
    ) -> Result<ImportSummary> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr.headers()?.clone();
        let col = |name: &str| headers.iter().position(|h| h.trim() == name);

        let status_col = col(STATUS);
        let amount_col = col(OPERATION_AMOUNT);
        let payment_col = col(PAYMENT_AMOUNT);
        let currency_col = col(OPERATION_CURRENCY);
        let date_col = col(OPERATION_DATE);
        let category_col = col(CATEGORY);
        let description_col = col(DESCRIPTION);

        let mut summary = ImportSummary::default();

        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let field = |col: Option<usize>| col.and_then(|i| record.get(i)).unwrap_or("");

            if field(status_col) != STATUS_OK {
                log_skip(idx, SkipReason::StatusNotSuccess);
                continue;
            }

            let raw_amount = match field(amount_col) {
                "" => field(payment_col),
                value => value,
            };
            if raw_amount.is_empty() {
                log_skip(idx, SkipReason::MissingAmount);
                continue;
            }

            let normalized = amount::normalize_amount(raw_amount);
            if normalized >= Decimal::ZERO {
                log_skip(idx, SkipReason::NonNegativeAmount);
                continue;
            }
            let amount = -normalized;

            let currency = match field(currency_col).trim() {
                "" => BASE_CURRENCY,
                value => value,
            }
            .to_string();

            // "05.12.2025 12:00" carries a time of day the record does not
            let date_text = field(date_col).split_whitespace().next().unwrap_or("");
            let Some(date) = dates::parse_dd_mm_yyyy(date_text) else {
                log_skip(idx, SkipReason::UnparseableDate);
                continue;
            };

            let category = match field(category_col).trim() {
                "" => UNCATEGORIZED,
                value => value,
            }
            .to_string();

            if self.exclusions.is_excluded(&category) {
                log_skip(idx, SkipReason::ExcludedCategory);
                continue;
            }

            let description = field(description_col).trim().to_string();

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

        debug!(
            created = summary.created,
            total = %summary.total,
            "parsed T-Bank ledger"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Дата операции;Дата платежа;Статус;Сумма операции;Валюта операции;Сумма платежа;Категория;Описание";

    fn parse(csv: &str) -> (Database, ImportSummary) {
        let db = Database::in_memory().unwrap();
        let summary = TbankCsvParser::default()
            .parse(&db, 1, Cursor::new(csv.as_bytes().to_vec()))
            .unwrap();
        (db, summary)
    }

    fn stored_rows(db: &Database) -> Vec<(String, String, String, String, String)> {
        let conn = db.conn().unwrap();
        let mut stmt = conn
            .prepare("SELECT amount, currency, date, description, bank FROM expenses ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .unwrap();
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_settled_outflow_becomes_expense() {
        let csv = format!(
            "{HEADER}\n05.12.2025 12:00;05.12.2025;OK;-150,50;RUB;-150,50;Еда;Магазин\n"
        );
        let (db, summary) = parse(&csv);

        assert_eq!(summary.created, 1);
        assert_eq!(summary.total, Decimal::new(15050, 2));

        let rows = stored_rows(&db);
        assert_eq!(rows.len(), 1);
        let (amount, currency, date, description, bank) = &rows[0];
        assert_eq!(amount, "150.50");
        assert_eq!(currency, "RUB");
        assert_eq!(date, "2025-12-05");
        assert_eq!(description, "Магазин");
        assert_eq!(bank, "T-Bank");

        let conn = db.conn().unwrap();
        let category: String = conn
            .query_row(
                "SELECT c.name FROM expenses e JOIN categories c ON c.id = e.category_id",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(category, "Еда");
    }

    #[test]
    fn test_bom_is_tolerated() {
        let csv = format!(
            "\u{feff}{HEADER}\n05.12.2025 12:00;05.12.2025;OK;-150,50;RUB;-150,50;Еда;Магазин\n"
        );
        let (_db, summary) = parse(&csv);
        assert_eq!(summary.created, 1);
    }

    #[test]
    fn test_failed_status_never_persists() {
        let csv = format!(
            "{HEADER}\n05.12.2025 12:00;05.12.2025;FAILED;-150,50;RUB;-150,50;Еда;Магазин\n"
        );
        let (db, summary) = parse(&csv);
        assert_eq!(summary, ImportSummary::default());
        assert!(stored_rows(&db).is_empty());
    }

    #[test]
    fn test_top_ups_and_refunds_are_skipped() {
        let csv = format!(
            "{HEADER}\n\
             05.12.2025 12:00;05.12.2025;OK;1000,00;RUB;1000,00;Пополнение;Зарплата\n\
             06.12.2025 09:30;06.12.2025;OK;0;RUB;0;Еда;Возврат\n\
             07.12.2025 10:00;07.12.2025;OK;-99;RUB;-99;Еда;Кафе\n"
        );
        let (_db, summary) = parse(&csv);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.total, Decimal::new(99, 0));
    }

    #[test]
    fn test_payment_amount_fallback() {
        let csv = format!(
            "{HEADER}\n05.12.2025 12:00;05.12.2025;OK;;RUB;-200,00;Еда;Магазин\n"
        );
        let (db, summary) = parse(&csv);
        assert_eq!(summary.created, 1);
        assert_eq!(stored_rows(&db)[0].0, "200.00");
    }

    #[test]
    fn test_missing_amount_is_skipped() {
        let csv = format!("{HEADER}\n05.12.2025 12:00;05.12.2025;OK;;RUB;;Еда;Магазин\n");
        let (_db, summary) = parse(&csv);
        assert_eq!(summary, ImportSummary::default());
    }

    #[test]
    fn test_unparseable_date_is_skipped() {
        let csv = format!(
            "{HEADER}\n\
             31.04.2025 12:00;31.04.2025;OK;-10;RUB;-10;Еда;Магазин\n\
             когда-то;;OK;-10;RUB;-10;Еда;Магазин\n"
        );
        let (_db, summary) = parse(&csv);
        assert_eq!(summary, ImportSummary::default());
    }

    #[test]
    fn test_blank_fields_get_defaults() {
        let csv = format!("{HEADER}\n05.12.2025 12:00;05.12.2025;OK;-55,10;;-55,10;;\n");
        let (db, summary) = parse(&csv);
        assert_eq!(summary.created, 1);

        let rows = stored_rows(&db);
        let (_, currency, _, description, _) = &rows[0];
        assert_eq!(currency, "RUB");
        // description falls back to the resolved category label
        assert_eq!(description, "Uncategorized");
    }

    #[test]
    fn test_transfer_category_is_excluded() {
        let csv = format!(
            "{HEADER}\n05.12.2025 12:00;05.12.2025;OK;-500,00;RUB;-500,00;Переводы;На карту\n"
        );
        let (db, summary) = parse(&csv);
        assert_eq!(summary, ImportSummary::default());
        assert!(stored_rows(&db).is_empty());
    }

    #[test]
    fn test_long_description_is_capped() {
        let long = "о".repeat(300);
        let csv = format!(
            "{HEADER}\n05.12.2025 12:00;05.12.2025;OK;-10;RUB;-10;Еда;{long}\n"
        );
        let (db, _summary) = parse(&csv);
        let rows = stored_rows(&db);
        assert_eq!(rows[0].3.chars().count(), 255);
    }

    #[test]
    fn test_total_matches_sum_of_persisted_amounts() {
        let csv = format!(
            "{HEADER}\n\
             01.12.2025 08:00;01.12.2025;OK;-100,10;RUB;-100,10;Еда;А\n\
             02.12.2025 08:00;02.12.2025;OK;-0,90;RUB;-0,90;Еда;Б\n\
             03.12.2025 08:00;03.12.2025;FAILED;-50,00;RUB;-50,00;Еда;В\n"
        );
        let (db, summary) = parse(&csv);

        let stored: Decimal = stored_rows(&db)
            .iter()
            .map(|(amount, ..)| amount.parse::<Decimal>().unwrap())
            .sum();
        assert_eq!(summary.total, stored);
        assert_eq!(summary.total, Decimal::new(10100, 2));
    }
}
