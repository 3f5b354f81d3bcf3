//! Shared utilities for Typerace.
//!
//! Logging setup and wall-clock helpers used by the server binary and its tests.

pub mod logger;
pub mod time;
