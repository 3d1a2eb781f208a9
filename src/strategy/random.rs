//! Uniform random strategy.

use super::{MoveGenerator, StrategyError, StrategyKind, legal_moves};
use crate::games::tictactoe::{Board, Player, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

/// Picks uniformly among the empty cells.
#[derive(Debug)]
pub struct RandomGenerator {
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Chooses one of `candidates`, failing if the slice is empty.
    pub(crate) fn choose(&self, candidates: &[Position]) -> Result<Position, StrategyError> {
        // A panic mid-choice cannot leave the rng in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        candidates
            .choose(&mut *rng)
            .copied()
            .ok_or(StrategyError::NoLegalMove)
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveGenerator for RandomGenerator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Random
    }

    #[instrument(skip(self, board))]
    fn generate_move(&self, player: Player, board: &Board) -> Result<Position, StrategyError> {
        let moves = legal_moves(board)?;
        let position = self.choose(&moves)?;
        debug!(%position, candidates = moves.len(), "Random move chosen");
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_cells_chosen() {
        let generator = RandomGenerator::seeded(7);
        let mut board = Board::new();
        for pos in Position::ALL.iter().take(8) {
            board.set_cell(*pos, Player::X);
        }
        for _ in 0..20 {
            let pos = generator.generate_move(Player::O, &board).unwrap();
            assert_eq!(pos, Position::ALL[8]);
        }
    }

    #[test]
    fn test_full_board_has_no_legal_move() {
        let generator = RandomGenerator::seeded(1);
        let mut board = Board::new();
        for pos in Position::ALL {
            board.set_cell(pos, Player::O);
        }
        assert_eq!(
            generator.generate_move(Player::X, &board),
            Err(StrategyError::NoLegalMove)
        );
    }

    #[test]
    fn test_covers_every_empty_cell() {
        let generator = RandomGenerator::seeded(42);
        let board = Board::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(generator.generate_move(Player::X, &board).unwrap());
        }
        assert_eq!(seen.len(), 9);
    }
}
