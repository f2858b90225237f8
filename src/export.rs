use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{EtlError, Result};
use crate::models::{EnrichedBankRecord, BANK_COLUMNS};

/// CSV row: the bank plus its position in the table
#[derive(Debug, Serialize)]
struct IndexedRow<'a> {
    index: usize,
    name: &'a str,
    usd: f64,
    gbp: f64,
    eur: f64,
    inr: f64,
}

/// Write the enriched table to `path`, replacing any existing file
pub fn write_csv(banks: &[EnrichedBankRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let write_error = |reason: String| EtlError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| write_error(e.to_string()))?;

    // index header is left blank, the way a dataframe export writes it
    let header = std::iter::once("").chain(BANK_COLUMNS);
    writer
        .write_record(header)
        .map_err(|e| write_error(e.to_string()))?;
    for (index, bank) in banks.iter().enumerate() {
        writer
            .serialize(IndexedRow {
                index,
                name: &bank.name,
                usd: bank.market_cap_usd_billion,
                gbp: bank.market_cap_gbp_billion,
                eur: bank.market_cap_eur_billion,
                inr: bank.market_cap_inr_billion,
            })
            .map_err(|e| write_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_error(e.to_string()))?;

    info!("Wrote {} rows to {}", banks.len(), path.display());
    Ok(())
}
