use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extractor::ExtractionRule;

/// One row of the largest-banks table as scraped from the page
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub market_cap_usd_billion: f64,
}

/// Bank row with the market cap converted into the reporting currencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBankRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub market_cap_usd_billion: f64,
    #[serde(rename = "MC_GBP_Billion")]
    pub market_cap_gbp_billion: f64,
    #[serde(rename = "MC_EUR_Billion")]
    pub market_cap_eur_billion: f64,
    #[serde(rename = "MC_INR_Billion")]
    pub market_cap_inr_billion: f64,
}

/// Column names shared by the CSV export and the database table
pub const BANK_COLUMNS: [&str; 5] = [
    "Name",
    "MC_USD_Billion",
    "MC_GBP_Billion",
    "MC_EUR_Billion",
    "MC_INR_Billion",
];

/// How a failed run is reported on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// One fixed message pointing at the log file, whatever went wrong.
    #[default]
    Compat,
    /// Error kind and message.
    Detailed,
}

/// Configuration for one ETL run
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub url: String,
    pub exchange_rate_path: PathBuf,
    pub csv_path: PathBuf,
    pub database_path: PathBuf,
    pub table_name: String,
    pub log_path: PathBuf,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub extraction: ExtractionRule,
    pub failure_mode: FailureMode,
}

pub const DEFAULT_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            exchange_rate_path: PathBuf::from("exchange_rate.csv"),
            csv_path: PathBuf::from("Largest_banks_data.csv"),
            database_path: PathBuf::from("Banks.db"),
            table_name: "Largest_banks".to_string(),
            log_path: PathBuf::from("code_log.txt"),
            request_timeout: Duration::from_secs(30),
            user_agent: "banks-etl/0.1".to_string(),
            extraction: ExtractionRule::default(),
            failure_mode: FailureMode::Compat,
        }
    }
}

impl EtlConfig {
    /// Re-root every local file (rate table, outputs, log) under `dir`,
    /// keeping the file names.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let reroot = |p: &Path| match p.file_name() {
            Some(name) => dir.join(name),
            None => dir.to_path_buf(),
        };
        self.exchange_rate_path = reroot(&self.exchange_rate_path);
        self.csv_path = reroot(&self.csv_path);
        self.database_path = reroot(&self.database_path);
        self.log_path = reroot(&self.log_path);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}
