mod game;
mod position;
pub mod rules;
mod types;

pub use game::{Game, GameError, GameId, MoveError};
pub use position::{Position, PositionError, RawPosition};
pub use types::{Board, BoardRows, GameStatus, Player};
