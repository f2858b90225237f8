pub mod api;
pub mod currency;
pub mod database;
pub mod error;
pub mod export;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod progress_log;
pub mod reporter;

pub use error::{EtlError, Result};
pub use models::{BankRecord, EnrichedBankRecord, EtlConfig, FailureMode};
pub use pipeline::{EtlPipeline, RunSummary};
