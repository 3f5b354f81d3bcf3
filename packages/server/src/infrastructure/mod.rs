//! Infrastructure layer.
//!
//! Wire DTOs, the in-memory stores owned by the coordinator, timers,
//! connection fan-out and text provider implementations.

pub mod broadcast;
pub mod dto;
pub mod repository;
pub mod text_provider;
pub mod timer;
