use std::io::Write;

use tracing::{error, info, warn};

use crate::api::PageSource;
use crate::currency;
use crate::database::BankDatabase;
use crate::error::{EtlError, Result};
use crate::export;
use crate::extractor::extract_banks;
use crate::models::{EnrichedBankRecord, EtlConfig, FailureMode};
use crate::progress_log::ProgressLog;
use crate::reporter::{self, QueryResult};

/// Console message printed for any failed run in compat mode
pub const COMPAT_FAILURE_MESSAGE: &str = "Error Occurred, Please check the log file";

pub const MSG_PRELIMINARIES: &str = "Preliminaries complete. Initiating ETL process";
pub const MSG_EXTRACTED: &str = "Data extraction complete. Initiating Transformation process";
pub const MSG_TRANSFORMED: &str = "Data transformation complete. Initiating Loading process";
pub const MSG_CSV_SAVED: &str = "Data saved to CSV file";
pub const MSG_SQL_CONNECTED: &str = "SQL Connection initiated";
pub const MSG_DB_LOADED: &str = "Data loaded to Database as a table, Executing queries";
pub const MSG_COMPLETE: &str = "Process Complete";

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub banks: Vec<EnrichedBankRecord>,
    pub reports: Vec<QueryResult>,
}

/// Console line for a failed run
pub fn failure_message(err: &EtlError, mode: FailureMode) -> String {
    match mode {
        FailureMode::Compat => COMPAT_FAILURE_MESSAGE.to_string(),
        FailureMode::Detailed => format!("ETL process failed ({}): {}", err.kind(), err),
    }
}

/// Extract → transform → load → report, one stage after the other
pub struct EtlPipeline {
    config: EtlConfig,
    progress: ProgressLog,
}

impl EtlPipeline {
    pub fn new(config: EtlConfig) -> Self {
        let progress = ProgressLog::new(config.log_path.clone());
        Self { config, progress }
    }

    /// Run every stage; the first error aborts the rest of the run.
    ///
    /// The database connection lives only inside this call and is closed
    /// on both the success and the error path.
    pub async fn run<S, W>(&self, source: &S, out: &mut W) -> Result<RunSummary>
    where
        S: PageSource + ?Sized,
        W: Write,
    {
        self.progress.log(MSG_PRELIMINARIES)?;

        let html = source.fetch_page().await?;
        let banks = extract_banks(&html, &self.config.extraction)?;
        self.progress.log(MSG_EXTRACTED)?;

        let extracted = banks.len();
        let enriched = currency::transform(banks, &self.config.exchange_rate_path)?;
        debug_assert_eq!(enriched.len(), extracted);
        self.progress.log(MSG_TRANSFORMED)?;

        export::write_csv(&enriched, &self.config.csv_path)?;
        self.progress.log(MSG_CSV_SAVED)?;

        let mut database = BankDatabase::open(&self.config.database_path)?;
        self.progress.log(MSG_SQL_CONNECTED)?;

        database.replace_table(&self.config.table_name, &enriched)?;
        self.progress.log(MSG_DB_LOADED)?;

        let reports = reporter::run_reports(&database, &self.config.table_name, out)?;
        self.progress.log(MSG_COMPLETE)?;

        database.close()?;
        info!("ETL run finished with {} banks from {}", enriched.len(), source.location());

        Ok(RunSummary {
            banks: enriched,
            reports,
        })
    }

    /// Run behind the top-level error boundary: a failure is logged,
    /// recorded in the progress log and reported on `out` according to
    /// the configured failure mode.
    pub async fn run_reported<S, W>(&self, source: &S, out: &mut W) -> Result<RunSummary>
    where
        S: PageSource + ?Sized,
        W: Write,
    {
        let result = self.run(source, out).await;
        if let Err(err) = &result {
            self.report_failure(err, out);
        }
        result
    }

    /// Record a failed run: `error!`, an "ETL process aborted" entry in the
    /// progress log, then the console message for the configured mode.
    /// Also used for failures that happen before a run can start.
    pub fn report_failure<W: Write>(&self, err: &EtlError, out: &mut W) {
        error!("ETL run failed ({}): {}", err.kind(), err);
        if let Err(log_err) = self.progress.log(&format!("ETL process aborted: {}", err)) {
            warn!("Could not record failure in progress log: {}", log_err);
        }
        if let Err(io_err) = writeln!(out, "{}", failure_message(err, self.config.failure_mode)) {
            warn!("Could not print failure message: {}", io_err);
        }
    }
}
