use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the ETL stages.
///
/// Every stage returns these unchanged; the pipeline is the only place
/// that catches them.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse failed: {0}")]
    Parse(String),

    #[error("exchange rate for {currency} missing from {source_path}")]
    MissingRate {
        currency: String,
        source_path: PathBuf,
    },

    #[error("invalid exchange rate in {source_path}: {reason}")]
    InvalidRate { source_path: PathBuf, reason: String },

    #[error("exchange rate source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("could not write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("could not append to progress log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EtlError {
    /// Short name of the error kind, used by the detailed failure report.
    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::Fetch { .. } => "FetchError",
            EtlError::Parse(_) => "ParseError",
            EtlError::MissingRate { .. } => "MissingRateError",
            EtlError::InvalidRate { .. } => "InvalidRateError",
            EtlError::SourceUnavailable { .. } => "SourceUnavailableError",
            EtlError::Write { .. } => "WriteError",
            EtlError::Storage(_) => "StorageError",
            EtlError::Log { .. } => "LogError",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
