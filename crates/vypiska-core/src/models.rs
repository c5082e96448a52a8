//! Domain models for vypiska

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency every multi-currency statement row is normalized to when a
/// converted-amount column is available.
pub const BASE_CURRENCY: &str = "RUB";

/// Category label applied when a source row carries none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Maximum stored description length, in characters.
///
/// Statement descriptions are Cyrillic, so the cap is applied on character
/// boundaries, never bytes.
pub const DESCRIPTION_MAX_CHARS: usize = 255;

/// Supported statement export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// T-Bank semicolon-delimited ledger export
    DelimitedLedger,
    /// Sberbank XLSX statement export
    SpreadsheetStatement,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DelimitedLedger => "tbank-csv",
            Self::SpreadsheetStatement => "sber-xlsx",
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tbank-csv" | "tbank" | "delimited-ledger" => Ok(Self::DelimitedLedger),
            "sber-xlsx" | "sber" | "spreadsheet-statement" => Ok(Self::SpreadsheetStatement),
            _ => Err(format!("Unknown source format: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense category, owned by exactly one user
///
/// At most one category exists per (user, name) pair; resolution during
/// import is an atomic get-or-create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One persisted expense record
///
/// `amount` is always the positive magnitude of the expense in `currency`,
/// regardless of the sign convention of the source export. `category_id` is a
/// weak reference: removing the category leaves the expense with no category,
/// it never cascades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub bank: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub bank: String,
    pub currency: String,
}

/// Aggregate result of one import call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Records persisted by this call
    pub created: usize,
    /// Sum of the persisted amounts
    pub total: Decimal,
}
