//! Provider backed by an HTTP word service.
//!
//! Performs one `GET` per race and reads the body as plain text. There is no
//! retry: the coordinator falls back to a fixed text on any error.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{TextProvider, TextProviderError};

pub struct HttpTextProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpTextProvider {
    /// Create a provider for `url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TextProviderError::Request` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TextProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextProviderError::Request(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextProvider for HttpTextProvider {
    async fn fetch_text(&self) -> Result<String, TextProviderError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TextProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TextProviderError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| TextProviderError::Request(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(TextProviderError::Empty);
        }
        tracing::debug!("Fetched race text ({} bytes) from {}", text.len(), self.url);
        Ok(text)
    }
}
