use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::error::{EtlError, Result};

/// Year-Monthname-Day-Hour:Minute:Second, e.g. 2023-Sep-08-09:16:35
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Format one progress line, newline included
pub fn format_entry(timestamp: NaiveDateTime, message: &str) -> String {
    format!("{} : {}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}

/// Append-only progress log.
///
/// The file is opened for each entry and closed right after, so nothing
/// is held open between stages.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with the current local time
    pub fn log(&self, message: &str) -> Result<()> {
        self.log_at(Local::now().naive_local(), message)
    }

    pub fn log_at(&self, timestamp: NaiveDateTime, message: &str) -> Result<()> {
        info!("{}", message);

        let line = format_entry(timestamp, message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.log_error(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.log_error(e))?;
        Ok(())
    }

    fn log_error(&self, source: std::io::Error) -> EtlError {
        EtlError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
