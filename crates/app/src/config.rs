//! Process configuration, read once at startup.

use std::path::PathBuf;

use kiemke_observability::{LogFormat, ParseLogFormatError};

use crate::cli::Cli;

pub const STORE_DIR_VAR: &str = "KIEMKE_STORE_DIR";
pub const LOG_FORMAT_VAR: &str = "KIEMKE_LOG_FORMAT";
pub const IMPLIED_DECIMALS_VAR: &str = "KIEMKE_IMPLIED_DECIMALS";
pub const ENFORCE_CHRONOLOGY_VAR: &str = "KIEMKE_ENFORCE_CHRONOLOGY";

const DEFAULT_STORE_DIR: &str = "./kiemke-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory of the JSON session store.
    pub store_dir: PathBuf,
    /// Implied decimal places for separator-less money cells on import.
    pub implied_decimals: Option<u32>,
    /// Order compared sessions by date instead of trusting argument order.
    pub enforce_chronology: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            implied_decimals: None,
            enforce_chronology: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Invalid values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(STORE_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.store_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(IMPLIED_DECIMALS_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(places) if places <= 6 => config.implied_decimals = Some(places),
                _ => tracing::warn!(
                    var = IMPLIED_DECIMALS_VAR,
                    value = %raw,
                    "expected 0-6; implied decimals disabled"
                ),
            }
        }

        if let Some(raw) = lookup(ENFORCE_CHRONOLOGY_VAR) {
            match parse_flag(&raw) {
                Some(flag) => config.enforce_chronology = flag,
                None => tracing::warn!(
                    var = ENFORCE_CHRONOLOGY_VAR,
                    value = %raw,
                    "expected true/false; keeping chronological ordering"
                ),
            }
        }

        config
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.store_dir {
            self.store_dir = dir.clone();
        }
        if let Some(places) = cli.implied_decimals {
            self.implied_decimals = Some(places);
        }
        if cli.keep_argument_order {
            self.enforce_chronology = false;
        }
        self
    }
}

/// Log format from `--log-format`, else the environment, else JSON.
///
/// Resolved on its own because logging is installed before [`AppConfig`] is
/// read, so that configuration warnings reach the chosen subscriber. An
/// invalid variable is returned as an error for the caller to report once
/// logging is up.
pub fn resolve_log_format(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LogFormat, ParseLogFormatError> {
    if let Some(format) = cli.log_format {
        return Ok(format);
    }
    match lookup(LOG_FORMAT_VAR) {
        Some(raw) => raw.parse(),
        None => Ok(LogFormat::default()),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
