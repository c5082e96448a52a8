//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vypiska - import bank statements into canonical expense records
#[derive(Parser)]
#[command(name = "vypiska")]
#[command(about = "Personal expense statement importer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "vypiska.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a bank statement export
    Import {
        /// Statement file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Source format: tbank-csv or sber-xlsx
        #[arg(short = 'F', long)]
        format: String,

        /// Owning user id
        #[arg(short, long, default_value_t = 1)]
        user: i64,
    },
}
