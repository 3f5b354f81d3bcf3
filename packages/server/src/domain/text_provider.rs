//! Race text source.
//!
//! The text generator is an external collaborator. The domain only needs one
//! call that yields a line of words; infrastructure decides where it comes from.

use async_trait::async_trait;

use super::error::TextProviderError;

/// Text used whenever the provider fails or returns nothing usable
pub const FALLBACK_TEXT: &str = "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs. How vexingly quick daft zebras jump!";

/// Source of race texts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Fetch the text for the next race. Called once per race, never retried.
    async fn fetch_text(&self) -> Result<String, TextProviderError>;
}

/// Turn a provider result into the text that will be raced.
///
/// Whitespace runs (including newlines) collapse to single spaces. Errors and
/// blank texts fall back to [`FALLBACK_TEXT`].
pub fn prepare_race_text(fetched: Result<String, TextProviderError>) -> String {
    let raw = match fetched {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Text provider failed, using fallback text: {}", e);
            return FALLBACK_TEXT.to_string();
        }
    };

    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        tracing::warn!("Text provider returned a blank text, using fallback text");
        return FALLBACK_TEXT.to_string();
    }
    text
}
