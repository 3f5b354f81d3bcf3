//! Provider that always hands out the same text.

use async_trait::async_trait;

use crate::domain::{FALLBACK_TEXT, TextProvider, TextProviderError};

/// Used when no text service is configured, and in tests.
pub struct FixedTextProvider {
    text: String,
}

impl FixedTextProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for FixedTextProvider {
    fn default() -> Self {
        Self::new(FALLBACK_TEXT)
    }
}

#[async_trait]
impl TextProvider for FixedTextProvider {
    async fn fetch_text(&self) -> Result<String, TextProviderError> {
        Ok(self.text.clone())
    }
}
