//! Domain layer for the typing race.
//!
//! This module contains the race rules (phases, roles, metrics, ranking)
//! independent of transport DTOs and runtime plumbing.

pub mod entity;
pub mod error;
pub mod factory;
pub mod ranking;
pub mod text_provider;
pub mod typing;
pub mod value_object;

pub use entity::{Phase, PlayerProgress, RaceState, Role, Session};
pub use error::{RaceError, TextProviderError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use text_provider::{FALLBACK_TEXT, TextProvider};
pub use value_object::{ConnectionId, TimeLimit, Timestamp, Username};
