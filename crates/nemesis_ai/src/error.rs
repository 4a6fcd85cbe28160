//! Error types for the behavior layer

use nemesis_core::{ConfigError, StateId};
use thiserror::Error;

/// Errors raised while assembling an enemy
#[derive(Debug, Error)]
pub enum AiError {
    #[error("State {0} is not registered in the state table")]
    UnregisteredState(StateId),

    #[error("State {0} is registered more than once")]
    DuplicateState(StateId),

    #[error("Invalid enemy configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a patrol cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatrolError {
    #[error("No waypoints and no fallback point")]
    NoRoute,

    #[error("None of the {0} patrol points lies on the navigable surface")]
    NoValidWaypoint(usize),
}

/// Result type for behavior assembly
pub type Result<T> = std::result::Result<T, AiError>;
