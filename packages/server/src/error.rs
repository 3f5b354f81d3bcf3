//! Server startup errors.

use thiserror::Error;

use crate::domain::TextProviderError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped with an error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("failed to set up the text provider: {0}")]
    TextProvider(#[from] TextProviderError),
}
