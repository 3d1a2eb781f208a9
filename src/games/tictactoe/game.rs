//! Authoritative tic-tac-toe rule engine.
//!
//! A [`Game`] is the single source of truth for move legality. Status only
//! moves forward, `InProgress -> {Win, Draw}`, and every mutation goes through
//! [`Game::make_move`].

use super::position::{Position, PositionError};
use super::rules;
use super::types::{Board, GameStatus, Player};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Opaque identifier of a game.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Why a move was rejected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game has already finished.
    #[display("Game is already over ({_0})")]
    GameOver(GameStatus),

    /// It's not this player's turn.
    #[display("It's not {actual}'s turn, {expected} to move")]
    WrongPlayer {
        /// Player whose turn it is.
        expected: Player,
        /// Player that attempted the move.
        actual: Player,
    },

    /// The target cell already holds a mark.
    #[display("Cell {_0} is already occupied")]
    CellOccupied(Position),
}

impl std::error::Error for MoveError {}

/// Errors returned by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum GameError {
    /// Coordinates outside the grid.
    #[display("{_0}")]
    OutOfRange(PositionError),
    /// A rule violation.
    #[display("Invalid move: {_0}")]
    InvalidMove(MoveError),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::OutOfRange(e) => Some(e),
            GameError::InvalidMove(e) => Some(e),
        }
    }
}

/// Tic-tac-toe game aggregate.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    board: Board,
    current_player: Player,
    status: GameStatus,
    winner: Option<Player>,
    history: Vec<Position>,
    created_at: DateTime<Utc>,
    last_move_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Creates a new game: empty board, X to move, in progress.
    #[instrument]
    pub fn new() -> Self {
        let id = GameId::generate();
        debug!(game_id = %id, "Creating game");
        Self {
            id,
            board: Board::new(),
            current_player: Player::X,
            status: GameStatus::InProgress,
            winner: None,
            history: Vec::new(),
            created_at: Utc::now(),
            last_move_at: None,
        }
    }

    /// Game identifier.
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move next. Meaningless once the game is over.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Winner, set if and only if status is `Win`.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Positions played so far, in order.
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last accepted move.
    pub fn last_move_at(&self) -> Option<DateTime<Utc>> {
        self.last_move_at
    }

    /// Returns true once the game has been won or drawn.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Places `player`'s mark at `position`.
    ///
    /// Returns the status after the move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] if the game is over, it is not
    /// `player`'s turn, or the cell is occupied.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn make_move(
        &mut self,
        position: Position,
        player: Player,
    ) -> Result<GameStatus, GameError> {
        if self.status.is_terminal() {
            warn!(status = ?self.status, "Move attempted on finished game");
            return Err(MoveError::GameOver(self.status).into());
        }

        if player != self.current_player {
            warn!(expected = ?self.current_player, "Move out of turn");
            return Err(MoveError::WrongPlayer {
                expected: self.current_player,
                actual: player,
            }
            .into());
        }

        if !self.board.is_cell_empty(position) {
            warn!("Cell already occupied");
            return Err(MoveError::CellOccupied(position).into());
        }

        self.board.set_cell(position, player);
        self.history.push(position);
        self.last_move_at = Some(Utc::now());

        if rules::has_won(&self.board, player) {
            self.status = GameStatus::Win;
            self.winner = Some(player);
            info!(winner = %player, moves = self.history.len(), "Game won");
        } else if rules::is_full(&self.board) {
            self.status = GameStatus::Draw;
            info!(moves = self.history.len(), "Game drawn");
        } else {
            self.current_player = player.opponent();
            debug!(next = %self.current_player, "Move accepted");
        }

        Ok(self.status)
    }

    /// Like [`Game::make_move`] but takes raw coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfRange`] for coordinates off the board, then
    /// any error from [`Game::make_move`].
    pub fn make_move_at(
        &mut self,
        row: usize,
        col: usize,
        player: Player,
    ) -> Result<GameStatus, GameError> {
        let position = Position::new(row, col)?;
        self.make_move(position, player)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
