//! Command-line configuration.

use std::time::Duration;

use clap::Parser;

/// Typerace race coordinator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// URL of a word service answering GET with plain text.
    /// Without it every race uses the built-in sentence.
    #[arg(long)]
    pub text_url: Option<String>,

    /// Timeout of one text request, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub text_timeout_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Config for a local server on `port` using the built-in text.
    pub fn local(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            text_url: None,
            text_timeout_ms: 3000,
            log_level: "info".to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn text_timeout(&self) -> Duration {
        Duration::from_millis(self.text_timeout_ms)
    }
}
