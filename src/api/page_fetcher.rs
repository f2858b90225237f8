use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::models::EtlConfig;
use super::PageSource;

/// Fetches the bank list page over HTTP(S)
pub struct HttpPageFetcher {
    client: Client,
    url: String,
}

impl HttpPageFetcher {
    /// Create a new fetcher for the configured URL
    pub fn new(config: &EtlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| EtlError::Fetch {
                url: config.url.clone(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    fn fetch_error(&self, err: reqwest::Error) -> EtlError {
        let reason = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if let Some(status) = err.status() {
            format!("server responded with {}", status)
        } else {
            err.to_string()
        };
        EtlError::Fetch {
            url: self.url.clone(),
            reason,
        }
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch_page(&self) -> Result<String> {
        info!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.fetch_error(e))?;

        let body = response.text().await.map_err(|e| self.fetch_error(e))?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}
