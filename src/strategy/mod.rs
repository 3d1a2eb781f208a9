//! Move generation strategies.
//!
//! A strategy looks at a board snapshot and proposes a cell for the given
//! player. Strategies never decide legality or outcome; the rule engine does.

mod ai;
mod factory;
mod random;
mod rule_based;

pub use ai::AiGenerator;
pub use factory::MoveGeneratorFactory;
pub use random::RandomGenerator;
pub use rule_based::RuleBasedGenerator;

use crate::games::tictactoe::{Board, Player, Position};
use serde::{Deserialize, Serialize};

/// Identifier of a move generation strategy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    /// Uniform choice among empty cells.
    #[default]
    Random,
    /// Win, block, centre, corner, then random.
    RuleBased,
    /// Exhaustive minimax search.
    Ai,
}

/// Errors raised by strategies and the strategy registry.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StrategyError {
    /// The board has no empty cell.
    #[display("No legal move: the board is full")]
    NoLegalMove,
    /// The requested strategy is not registered.
    #[display("Unsupported strategy: {_0}")]
    UnsupportedStrategy(String),
}

impl std::error::Error for StrategyError {}

/// Produces a candidate move for a player given a board snapshot.
///
/// Implementations must only return empty cells and must fail with
/// [`StrategyError::NoLegalMove`] when there are none.
pub trait MoveGenerator: Send + Sync + std::fmt::Debug {
    /// Strategy this generator implements.
    fn kind(&self) -> StrategyKind;

    /// Picks a position for `player` on `board`.
    fn generate_move(&self, player: Player, board: &Board) -> Result<Position, StrategyError>;
}

/// Empty cells of `board`, or `NoLegalMove` if there are none.
pub(crate) fn legal_moves(board: &Board) -> Result<Vec<Position>, StrategyError> {
    let moves = board.empty_positions();
    if moves.is_empty() {
        return Err(StrategyError::NoLegalMove);
    }
    Ok(moves)
}
