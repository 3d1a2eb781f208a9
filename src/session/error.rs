//! Session error types.

use super::model::SessionId;
use crate::engine::EngineError;
use crate::games::tictactoe::Player;
use crate::strategy::StrategyError;
use std::time::Duration;

/// Errors raised by session operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// A lifecycle guard rejected the operation.
    #[display("Invalid session state: {_0}")]
    InvalidSessionState(String),

    /// The orchestration loop failed. The session is already `Failed`.
    #[display("Simulation of session {session_id} failed: {cause}")]
    SimulationFailed {
        /// Session that failed.
        session_id: SessionId,
        /// What went wrong.
        cause: SimulationError,
    },
}

impl SessionError {
    /// Shorthand for [`SessionError::InvalidSessionState`].
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidSessionState(message.into())
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidSessionState(_) => None,
            SessionError::SimulationFailed { cause, .. } => Some(cause),
        }
    }
}

/// Underlying cause of a failed simulation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SimulationError {
    /// The engine call failed or was refused.
    #[display("{_0}")]
    Engine(EngineError),

    /// The strategy could not produce a move.
    #[display("{_0}")]
    Strategy(StrategyError),

    /// A session guard rejected a step of the loop.
    #[display("{_0}")]
    Lifecycle(Box<SessionError>),

    /// The caller cancelled while waiting on the engine.
    #[display("Cancelled during {operation}")]
    Cancelled {
        /// Engine call in flight.
        operation: &'static str,
    },

    /// An engine call exceeded its deadline.
    #[display("{operation} timed out after {after:?}")]
    TimedOut {
        /// Engine call in flight.
        operation: &'static str,
        /// Configured deadline.
        after: Duration,
    },

    /// Local turn tracking disagrees with the engine.
    #[display("Turn divergence: expected {local} to move, engine says {remote}")]
    TurnDivergence {
        /// Player tracked by the session.
        local: Player,
        /// Player reported by the engine.
        remote: Player,
    },
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Engine(e) => Some(e),
            SimulationError::Strategy(e) => Some(e),
            SimulationError::Lifecycle(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<EngineError> for SimulationError {
    fn from(err: EngineError) -> Self {
        SimulationError::Engine(err)
    }
}

impl From<StrategyError> for SimulationError {
    fn from(err: StrategyError) -> Self {
        SimulationError::Strategy(err)
    }
}

impl From<SessionError> for SimulationError {
    fn from(err: SessionError) -> Self {
        SimulationError::Lifecycle(Box::new(err))
    }
}
