//! In-memory stores owned by the race coordinator.
//!
//! They are plain structs without locks: only the coordinator task touches
//! them, one command at a time.

pub mod inmemory;

pub use inmemory::{JoinOutcome, ProgressStore, SessionRegistry};
