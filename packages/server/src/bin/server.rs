//! Typerace race coordinator server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin typerace-server -- --port 8080 --text-url http://localhost:5000/words
//! ```

use clap::Parser;
use typerace_server::ServerConfig;
use typerace_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = typerace_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
