//! Common test utilities and helpers

use std::path::{Path, PathBuf};

use banks_etl::models::EtlConfig;
use tempfile::TempDir;

/// Saved pages and rate tables under tests/fixtures
pub mod fixtures {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
    }

    fn read(name: &str) -> String {
        std::fs::read_to_string(dir().join(name))
            .unwrap_or_else(|e| panic!("missing fixture {}: {}", name, e))
    }

    /// Ten-row copy of the largest banks page
    pub fn largest_banks_page() -> String {
        read("largest_banks.html")
    }

    /// Same page layout with just Bank A (100.0) and Bank B (50.0)
    pub fn two_banks_page() -> String {
        read("two_banks.html")
    }

    /// GBP 0.8, EUR 0.93, INR 82.5
    pub fn e2e_rates() -> String {
        read("e2e_exchange_rate.csv")
    }

    /// GBP 0.8, EUR 0.93, INR 82.95
    pub fn reference_rates() -> String {
        read("exchange_rate.csv")
    }
}

/// Scratch directory holding a rate table and every output of one run
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new(rates_csv: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("exchange_rate.csv"), rates_csv)
            .expect("Failed to write rate table");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> EtlConfig {
        EtlConfig::default().with_output_dir(self.path())
    }

    pub fn log_lines(&self) -> Vec<String> {
        match std::fs::read_to_string(self.file("code_log.txt")) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Test data utilities
pub mod test_data {
    use banks_etl::models::EnrichedBankRecord;

    pub fn create_test_bank(name: &str, usd: f64, gbp: f64, eur: f64, inr: f64) -> EnrichedBankRecord {
        EnrichedBankRecord {
            name: name.to_string(),
            market_cap_usd_billion: usd,
            market_cap_gbp_billion: gbp,
            market_cap_eur_billion: eur,
            market_cap_inr_billion: inr,
        }
    }

    /// The table the end-to-end scenario must produce
    pub fn expected_two_banks() -> Vec<EnrichedBankRecord> {
        vec![
            create_test_bank("Bank A", 100.0, 80.0, 93.0, 8250.0),
            create_test_bank("Bank B", 50.0, 40.0, 46.5, 4125.0),
        ]
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // another test may already have installed a subscriber
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("banks_etl=debug,main=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
