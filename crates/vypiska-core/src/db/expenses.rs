//! Expense record creation

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::NewExpense;

impl Database {
    /// Insert one canonical expense record, returning its row id
    ///
    /// Records are immutable once written by the import pipeline; there is
    /// deliberately no update or delete counterpart here.
    pub fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO expenses (user_id, category_id, amount, date, description, bank, currency)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                expense.user_id,
                expense.category_id,
                expense.amount.to_string(),
                expense.date.to_string(),
                expense.description,
                expense.bank,
                expense.currency,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }
}
