use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use kiemke_core::SessionDate;
use kiemke_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "kiemke", about = "Stock-count (kiểm kê) session comparer", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Session store directory [env: KIEMKE_STORE_DIR]
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Log output: json or pretty [env: KIEMKE_LOG_FORMAT]
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Implied decimal places for money cells without separators [env: KIEMKE_IMPLIED_DECIMALS]
    #[arg(long, global = true)]
    pub implied_decimals: Option<u32>,

    /// Compare sessions in the order given instead of by date
    #[arg(long, global = true)]
    pub keep_argument_order: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare two session JSON files
    Compare(CompareArgs),
    /// Import a sheet exported as a JSON array of rows
    Import(ImportArgs),
    /// Zero out items missing from the newer of two stored sessions
    Remediate(RemediateArgs),
    /// List stored session dates
    History,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub older: PathBuf,
    #[arg(long)]
    pub newer: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Session date (yyyy-mm-dd or dd/mm/yyyy)
    #[arg(long)]
    pub date: SessionDate,
    #[arg(long)]
    pub rows: PathBuf,
    /// Upsert the imported lines into the store
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct RemediateArgs {
    #[arg(long)]
    pub older: SessionDate,
    #[arg(long)]
    pub newer: SessionDate,
    /// Date of the session receiving the zero lines (default: today)
    #[arg(long)]
    pub today: Option<SessionDate>,
}
