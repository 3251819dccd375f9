//! Command runners. Each returns the JSON document printed on stdout.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use kiemke_core::SessionDate;
use kiemke_import::{NumberFormat, import_rows};
use kiemke_infra::{SessionStore, remediate_out_of_stock};
use kiemke_inventory::{
    CompareSummary, Comparison, InventorySession, compare_chronological, compare_sessions,
};

use crate::cli::{Command, CompareArgs, ImportArgs, RemediateArgs};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    date: SessionDate,
    items: usize,
}

pub fn run_command(
    command: &Command,
    config: &AppConfig,
    store: &dyn SessionStore,
) -> anyhow::Result<Value> {
    match command {
        Command::Compare(args) => cmd_compare(args, config),
        Command::Import(args) => cmd_import(args, config, store),
        Command::Remediate(args) => cmd_remediate(args, store),
        Command::History => cmd_history(store),
    }
}

fn cmd_compare(args: &CompareArgs, config: &AppConfig) -> anyhow::Result<Value> {
    let first: InventorySession = read_json(&args.older)?;
    let second: InventorySession = read_json(&args.newer)?;

    let comparison = if config.enforce_chronology {
        compare_chronological(&first, &second)
    } else {
        let results = compare_sessions(&first, &second);
        Comparison {
            older_date: first.date,
            newer_date: second.date,
            summary: CompareSummary::from_results(&results),
            results,
        }
    };

    tracing::info!(
        older = %comparison.older_date,
        newer = %comparison.newer_date,
        items = comparison.results.len(),
        "sessions compared"
    );
    Ok(serde_json::to_value(&comparison)?)
}

fn cmd_import(args: &ImportArgs, config: &AppConfig, store: &dyn SessionStore) -> anyhow::Result<Value> {
    let raw: Vec<Vec<Value>> = read_json(&args.rows)?;
    let rows: Vec<Vec<String>> = raw
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();

    let format = NumberFormat {
        implied_decimals: config.implied_decimals,
    };
    let report = import_rows(&rows, args.date, &format)
        .with_context(|| format!("importing {}", args.rows.display()))?;

    if args.save {
        if report.session.is_empty() {
            bail!("nothing to save: no valid rows in {}", args.rows.display());
        }
        store
            .save(args.date, report.session.items.clone())
            .context("saving imported session")?;
        tracing::info!(date = %args.date, lines = report.imported(), "imported session saved");
    }

    Ok(serde_json::to_value(&report)?)
}

fn cmd_remediate(args: &RemediateArgs, store: &dyn SessionStore) -> anyhow::Result<Value> {
    let today = args.today.unwrap_or_else(SessionDate::today);
    let batch = remediate_out_of_stock(store, args.older, args.newer, today)?;
    Ok(serde_json::to_value(&batch)?)
}

fn cmd_history(store: &dyn SessionStore) -> anyhow::Result<Value> {
    let mut entries = Vec::new();
    for date in store.list_dates()? {
        let items = store.load(date)?.map(|s| s.len()).unwrap_or(0);
        entries.push(HistoryEntry { date, items });
    }
    Ok(serde_json::to_value(&entries)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Sheet exports mix text and numeric cells.
fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}
