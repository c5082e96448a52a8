//! CLI command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use vypiska_core::{import_statement, Database, SourceFormat};

/// Open the database, creating it and running migrations when missing
fn open_db(db_path: &Path) -> Result<Database> {
    let path = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path).with_context(|| format!("Failed to open database: {}", path))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    println!("Database initialized at {}", db.path());
    Ok(())
}

pub fn cmd_import(db_path: &Path, file: &Path, format_str: &str, user: i64) -> Result<()> {
    // Free-text identifiers are validated here, before any parser runs
    let format: SourceFormat = format_str.parse().map_err(|_| {
        anyhow::anyhow!(
            "Unknown source format: {} (expected tbank-csv or sber-xlsx)",
            format_str
        )
    })?;

    let db = open_db(db_path)?;
    let statement =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing {} from {}...", format, file.display());

    let summary = import_statement(&db, user, format, statement)?;
    info!(
        user,
        format = %format,
        created = summary.created,
        total = %summary.total,
        "statement import complete"
    );

    println!(
        "   Created {} expense records, total {}",
        summary.created, summary.total
    );
    Ok(())
}
