//! Domain events raised by sessions.

use super::model::{SessionId, SessionResult};
use crate::games::tictactoe::{GameId, Player, Position};
use crate::strategy::StrategyKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable fact about a session.
///
/// Events queue up on the [`Session`](super::Session) and stay there until a
/// consumer drains or clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    /// A session was created.
    SessionCreated {
        /// Session identifier.
        session_id: SessionId,
        /// Strategy chosen at creation.
        strategy: StrategyKind,
        /// When it happened.
        occurred_at: DateTime<Utc>,
    },
    /// A game was attached or a simulation began.
    SimulationStarted {
        /// Session identifier.
        session_id: SessionId,
        /// Game being played, if one is attached.
        game_id: Option<GameId>,
        /// When it happened.
        occurred_at: DateTime<Utc>,
    },
    /// A move was recorded.
    MoveMade {
        /// Session identifier.
        session_id: SessionId,
        /// Game the move was played in.
        game_id: Option<GameId>,
        /// Player that moved.
        player: Player,
        /// Cell played.
        position: Position,
        /// 1-based move number.
        move_number: u32,
        /// When it happened.
        occurred_at: DateTime<Utc>,
    },
    /// The game finished.
    GameCompleted {
        /// Session identifier.
        session_id: SessionId,
        /// Game that finished.
        game_id: Option<GameId>,
        /// Win or draw.
        result: SessionResult,
        /// Winning player, if any.
        winner: Option<Player>,
        /// When it happened.
        occurred_at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Session the event belongs to.
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionEvent::SessionCreated { session_id, .. }
            | SessionEvent::SimulationStarted { session_id, .. }
            | SessionEvent::MoveMade { session_id, .. }
            | SessionEvent::GameCompleted { session_id, .. } => session_id,
        }
    }

    /// Event name, as used in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SessionCreated { .. } => "SessionCreated",
            SessionEvent::SimulationStarted { .. } => "SimulationStarted",
            SessionEvent::MoveMade { .. } => "MoveMade",
            SessionEvent::GameCompleted { .. } => "GameCompleted",
        }
    }
}
