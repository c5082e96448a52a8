//! Vypiska Core Library
//!
//! Shared functionality for the vypiska expense statement importer:
//! - Storage layer for per-user categories and canonical expense records
//! - Statement parsers for the supported bank export formats
//! - Amount and date normalizers for locale-formatted statement values
//! - Transfer/top-up exclusion heuristic shared by the parsers
//!
//! The entry point is [`import::import_statement`]: give it a database, the
//! owning user, a declared source format, and the uploaded file, and it
//! returns how many expense records were created and their total amount.

pub mod db;
pub mod error;
pub mod import;
pub mod models;

pub use db::Database;
pub use error::{Error, Result};
pub use import::{
    import_statement, ExclusionFilter, SberXlsxParser, SkipReason, StatementParser,
    TbankCsvParser,
};
pub use models::{
    Category, Expense, ImportSummary, NewExpense, SourceFormat, BASE_CURRENCY,
    DESCRIPTION_MAX_CHARS, UNCATEGORIZED,
};
