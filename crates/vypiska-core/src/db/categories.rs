//! Category operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::Category;

impl Database {
    /// Atomically resolve a (user, name) pair to its category, creating it
    /// when missing
    ///
    /// Two imports for the same user may race on a new label. The
    /// conflict-tolerant insert lets both proceed: one insert wins, the other
    /// is a no-op, and the re-select below returns the surviving row either
    /// way.
    pub fn get_or_create_category(&self, user_id: i64, name: &str) -> Result<Category> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES (?, ?)
            ON CONFLICT (user_id, name) DO NOTHING
            "#,
            params![user_id, name],
        )?;

        let category = conn.query_row(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE user_id = ? AND name = ?
            "#,
            params![user_id, name],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )?;

        Ok(category)
    }
}
