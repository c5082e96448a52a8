//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sample_expense(user_id: i64, category_id: Option<i64>) -> NewExpense {
        NewExpense {
            user_id,
            category_id,
            amount: Decimal::new(15050, 2),
            date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
            description: "Магазин".to_string(),
            bank: "T-Bank".to_string(),
            currency: "RUB".to_string(),
        }
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('categories') WHERE name IN ('id', 'user_id', 'name', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 4, "categories table should have 4 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('expenses') WHERE name IN ('id', 'user_id', 'category_id', 'amount', 'date', 'description', 'bank', 'currency', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 9, "expenses table should have 9 expected columns");
    }

    #[test]
    fn test_get_or_create_category_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let first = db.get_or_create_category(1, "Еда").unwrap();
        let second = db.get_or_create_category(1, "Еда").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Еда");

        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_categories_are_scoped_per_user() {
        let db = Database::in_memory().unwrap();

        let mine = db.get_or_create_category(1, "Еда").unwrap();
        let theirs = db.get_or_create_category(2, "Еда").unwrap();
        assert_ne!(mine.id, theirs.id);
    }

    #[test]
    fn test_category_names_are_case_and_whitespace_sensitive() {
        let db = Database::in_memory().unwrap();

        let a = db.get_or_create_category(1, "Еда").unwrap();
        let b = db.get_or_create_category(1, "еда").unwrap();
        let c = db.get_or_create_category(1, "Еда ").unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_insert_expense_round_trips_decimal_text() {
        let db = Database::in_memory().unwrap();
        let category = db.get_or_create_category(1, "Еда").unwrap();

        let id = db
            .insert_expense(&sample_expense(1, Some(category.id)))
            .unwrap();
        assert!(id > 0);

        let conn = db.conn().unwrap();
        let (amount, currency): (String, String) = conn
            .query_row(
                "SELECT amount, currency FROM expenses WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(amount.parse::<Decimal>().unwrap(), Decimal::new(15050, 2));
        assert_eq!(currency, "RUB");
    }

    #[test]
    fn test_deleting_category_orphans_expense() {
        let db = Database::in_memory().unwrap();
        let category = db.get_or_create_category(1, "Еда").unwrap();
        let id = db
            .insert_expense(&sample_expense(1, Some(category.id)))
            .unwrap();

        let conn = db.conn().unwrap();
        conn.execute("DELETE FROM categories WHERE id = ?", [category.id])
            .unwrap();

        let category_id: Option<i64> = conn
            .query_row("SELECT category_id FROM expenses WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(category_id, None, "weak reference should degrade to NULL");
    }
}
