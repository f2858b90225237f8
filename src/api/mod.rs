use async_trait::async_trait;

use crate::error::Result;

pub mod page_fetcher;
pub use page_fetcher::HttpPageFetcher;

/// Source of the raw page markup the extractor works on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource {
    /// Location the markup comes from, used in logs and errors
    fn location(&self) -> String;

    async fn fetch_page(&self) -> Result<String>;
}

/// Markup already held in memory, e.g. a saved copy of the page
pub struct StaticPage {
    location: String,
    html: String,
}

impl StaticPage {
    pub fn new(location: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
impl PageSource for StaticPage {
    fn location(&self) -> String {
        self.location.clone()
    }

    async fn fetch_page(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}
