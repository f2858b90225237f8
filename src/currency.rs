use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::models::{BankRecord, EnrichedBankRecord};

/// Currencies every rate table must provide
pub const REQUIRED_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// USD exchange rates keyed by currency code
#[derive(Debug, Clone)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
    source: PathBuf,
}

impl ExchangeRateTable {
    /// Load the rate table from a `Currency,Rate` CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| EtlError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut rates = HashMap::new();
        for row in reader.deserialize::<RateRow>() {
            let row = row.map_err(|e| match e.kind() {
                csv::ErrorKind::Io(_) => EtlError::SourceUnavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
                _ => EtlError::InvalidRate {
                    source_path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            })?;
            let currency = row.currency;
            if !row.rate.is_finite() || row.rate <= 0.0 {
                return Err(EtlError::InvalidRate {
                    source_path: path.to_path_buf(),
                    reason: format!("{} has non-positive rate {}", currency, row.rate),
                });
            }
            debug!("Rate {} = {}", currency, row.rate);
            rates.insert(currency, row.rate);
        }

        info!("Loaded {} exchange rates from {}", rates.len(), path.display());
        Ok(Self {
            rates,
            source: path.to_path_buf(),
        })
    }

    pub fn from_rates<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            rates: rates.into_iter().map(|(c, r)| (c.into(), r)).collect(),
            source: PathBuf::from("<memory>"),
        }
    }

    pub fn rate(&self, currency: &str) -> Result<f64> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| EtlError::MissingRate {
                currency: currency.to_string(),
                source_path: self.source.clone(),
            })
    }
}

/// Round to two decimals: scale by 100, round half to even, scale back.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Add GBP, EUR and INR market caps to every bank, keeping row order
pub fn convert(banks: Vec<BankRecord>, rates: &ExchangeRateTable) -> Result<Vec<EnrichedBankRecord>> {
    let gbp = rates.rate("GBP")?;
    let eur = rates.rate("EUR")?;
    let inr = rates.rate("INR")?;

    Ok(banks
        .into_iter()
        .map(|bank| {
            let usd = bank.market_cap_usd_billion;
            EnrichedBankRecord {
                name: bank.name,
                market_cap_usd_billion: usd,
                market_cap_gbp_billion: round2(usd * gbp),
                market_cap_eur_billion: round2(usd * eur),
                market_cap_inr_billion: round2(usd * inr),
            }
        })
        .collect())
}

/// Load the rate table from `rate_path` and convert the banks with it
pub fn transform(banks: Vec<BankRecord>, rate_path: impl AsRef<Path>) -> Result<Vec<EnrichedBankRecord>> {
    let rates = ExchangeRateTable::load(rate_path)?;
    convert(banks, &rates)
}
