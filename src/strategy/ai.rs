//! Perfect-play strategy using negamax with alpha-beta pruning.

use super::{MoveGenerator, StrategyError, StrategyKind, legal_moves};
use crate::games::tictactoe::{Board, Player, Position, rules};
use tracing::{debug, instrument};

const WIN_SCORE: i32 = 10;

/// Searches the full game tree and plays the best move.
///
/// Faster wins score higher and slower losses score higher, so the
/// generator finishes games promptly and resists as long as possible.
/// Ties go to the centre, then corners, then edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiGenerator;

impl AiGenerator {
    /// Creates the generator.
    pub fn new() -> Self {
        Self
    }
}

/// Search order: centre, corners, edges.
fn ordered(moves: Vec<Position>) -> Vec<Position> {
    let rank = |pos: &Position| {
        if *pos == Position::CENTER {
            0
        } else if Position::CORNERS.contains(pos) {
            1
        } else {
            2
        }
    };
    let mut moves = moves;
    moves.sort_by_key(rank);
    moves
}

/// Score of `board` from the perspective of `to_move`, who is about to play.
fn negamax(board: &Board, to_move: Player, depth: i32, mut alpha: i32, beta: i32) -> i32 {
    if rules::has_won(board, to_move.opponent()) {
        return -(WIN_SCORE - depth);
    }
    if board.is_full() {
        return 0;
    }

    let mut best = -WIN_SCORE - 1;
    for pos in ordered(board.empty_positions()) {
        let mut next = *board;
        next.set_cell(pos, to_move);
        let score = -negamax(&next, to_move.opponent(), depth + 1, -beta, -alpha);
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best
}

impl MoveGenerator for AiGenerator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ai
    }

    #[instrument(skip(self, board))]
    fn generate_move(&self, player: Player, board: &Board) -> Result<Position, StrategyError> {
        let moves = ordered(legal_moves(board)?);

        let mut best: Option<(Position, i32)> = None;
        for pos in moves {
            let mut next = *board;
            next.set_cell(pos, player);
            let score = -negamax(&next, player.opponent(), 1, -WIN_SCORE - 1, WIN_SCORE + 1);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pos, score));
            }
        }

        let (position, score) = best.ok_or(StrategyError::NoLegalMove)?;
        debug!(%position, score, "Search complete");
        Ok(position)
    }
}
