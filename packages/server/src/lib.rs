//! Typerace race coordinator.
//!
//! A WebSocket server that runs one shared typing race at a time: players
//! join, one of them starts the race, everyone types the same text and the
//! server keeps score.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
