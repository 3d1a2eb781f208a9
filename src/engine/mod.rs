//! Game engine client contract.
//!
//! The engine owns every [`Game`] and is the only party allowed to mutate
//! one. Sessions talk to it through [`GameEngine`], either in-process
//! ([`LocalGameEngine`]) or over HTTP ([`HttpGameEngine`]).

mod http;
mod local;

pub use http::HttpGameEngine;
pub use local::LocalGameEngine;

use crate::games::tictactoe::{
    Board, BoardRows, Game, GameError, GameId, GameStatus, Player, Position,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response to a game creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGame {
    /// Identifier of the new game.
    pub game_id: GameId,
    /// When the engine created it.
    pub created_at: DateTime<Utc>,
}

/// Game status as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum RemoteStatus {
    /// Moves are still accepted.
    InProgress,
    /// A player completed a line.
    Win,
    /// Board full without a line.
    Draw,
    /// Finished, outcome carried by `winner`.
    Completed,
}

impl RemoteStatus {
    /// Returns true for every status other than `InProgress`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RemoteStatus::InProgress)
    }
}

impl From<GameStatus> for RemoteStatus {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::InProgress => RemoteStatus::InProgress,
            GameStatus::Win => RemoteStatus::Win,
            GameStatus::Draw => RemoteStatus::Draw,
        }
    }
}

/// Snapshot of a game as exchanged with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    /// Game identifier.
    pub game_id: GameId,
    /// Current status.
    pub status: RemoteStatus,
    /// Player to move.
    pub current_player: Player,
    /// Winner tag (`"X"` or `"O"`), if any.
    #[serde(default)]
    pub winner: Option<String>,
    /// Board rows of `"X"`, `"O"` or `null`.
    pub board: BoardRows,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last accepted move.
    #[serde(default)]
    pub last_move_at: Option<DateTime<Utc>>,
}

impl GameStateView {
    /// Builds the wire view of a game.
    pub fn from_game(game: &Game) -> Self {
        Self {
            game_id: game.id().clone(),
            status: game.status().into(),
            current_player: game.current_player(),
            winner: game.winner().map(|p| p.tag().to_string()),
            board: game.board().to_rows(),
            created_at: game.created_at(),
            last_move_at: game.last_move_at(),
        }
    }

    /// Winner parsed from its tag. Unknown tags read as no winner.
    pub fn winner_player(&self) -> Option<Player> {
        self.winner.as_deref().and_then(Player::from_tag)
    }

    /// Reconstructs a read-only board snapshot.
    pub fn board(&self) -> Board {
        Board::from_rows(&self.board)
    }
}

/// Errors talking to the game engine.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// No game with this id.
    #[display("Game {_0} not found")]
    NotFound(GameId),
    /// The engine refused the move.
    #[display("{_0}")]
    Rule(GameError),
    /// The engine answered with a non-success status.
    #[display("Engine rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
    /// The request never completed.
    #[display("Engine transport error: {_0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[display("Malformed engine response: {_0}")]
    Decode(String),
    /// The engine's store is unusable.
    #[display("Engine unavailable: {_0}")]
    Unavailable(String),
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Rule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GameError> for EngineError {
    fn from(err: GameError) -> Self {
        EngineError::Rule(err)
    }
}

/// Client contract for the authoritative game engine.
///
/// Every call is an I/O boundary from the caller's point of view.
#[async_trait::async_trait]
pub trait GameEngine: Send + Sync {
    /// Creates a new game.
    async fn create_game(&self) -> Result<CreatedGame, EngineError>;

    /// Submits a move for whichever player is to move.
    async fn make_move(
        &self,
        game_id: &GameId,
        position: Position,
    ) -> Result<GameStateView, EngineError>;

    /// Fetches the current state.
    async fn get_state(&self, game_id: &GameId) -> Result<GameStateView, EngineError>;
}
