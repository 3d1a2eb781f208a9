//! Heuristic strategy: win, block, centre, corner, random.

use super::{MoveGenerator, RandomGenerator, StrategyError, StrategyKind, legal_moves};
use crate::games::tictactoe::{Board, Player, Position, rules};
use tracing::{debug, instrument};

/// Rule-based move selection.
///
/// In priority order: complete a line, block the opponent's line, take the
/// centre, take a corner, otherwise fall back to a random empty cell.
#[derive(Debug, Default)]
pub struct RuleBasedGenerator {
    fallback: RandomGenerator,
}

impl RuleBasedGenerator {
    /// Creates a rule-based generator with an entropy-seeded fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule-based generator with a deterministic fallback.
    pub fn seeded(seed: u64) -> Self {
        Self {
            fallback: RandomGenerator::seeded(seed),
        }
    }
}

/// First empty cell that completes a line for `player`.
pub(crate) fn winning_move(board: &Board, player: Player) -> Option<Position> {
    board.empty_positions().into_iter().find(|pos| {
        let mut next = *board;
        next.set_cell(*pos, player);
        rules::has_won(&next, player)
    })
}

impl MoveGenerator for RuleBasedGenerator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    #[instrument(skip(self, board))]
    fn generate_move(&self, player: Player, board: &Board) -> Result<Position, StrategyError> {
        let moves = legal_moves(board)?;

        if let Some(pos) = winning_move(board, player) {
            debug!(%pos, "Taking winning cell");
            return Ok(pos);
        }

        if let Some(pos) = winning_move(board, player.opponent()) {
            debug!(%pos, "Blocking opponent");
            return Ok(pos);
        }

        if board.is_cell_empty(Position::CENTER) {
            return Ok(Position::CENTER);
        }

        let corners: Vec<Position> = Position::CORNERS
            .iter()
            .copied()
            .filter(|pos| board.is_cell_empty(*pos))
            .collect();
        if !corners.is_empty() {
            return self.fallback.choose(&corners);
        }

        self.fallback.choose(&moves)
    }
}
