//! Domain layer error definitions.

use thiserror::Error;

use super::entity::Phase;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// Race time limit outside the accepted range
    #[error("Time limit must be between {min} and {max} seconds (got {actual})")]
    TimeLimitOutOfRange { min: u32, max: u32, actual: u32 },
}

/// Errors raised while applying an inbound event to the race.
///
/// None of these are fatal: the coordinator logs them and moves on to the
/// next event with the race state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RaceError {
    /// The event is not allowed in the current phase
    #[error("'{action}' is not allowed while the race is {phase}")]
    IllegalTransition { action: &'static str, phase: Phase },

    /// A spectator tried to take part in the current race
    #[error("spectators cannot '{action}' until the next race")]
    SpectatorViolation { action: &'static str },

    /// The connection has not joined the game
    #[error("connection '{0}' has not joined the game")]
    UnknownConnection(String),

    /// The payload failed validation
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] ValueObjectError),
}

/// Errors reported by a race text provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextProviderError {
    /// The request could not be completed
    #[error("text request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status
    #[error("text provider responded with status {0}")]
    Status(u16),

    /// The provider answered with nothing usable
    #[error("text provider returned an empty text")]
    Empty,
}
