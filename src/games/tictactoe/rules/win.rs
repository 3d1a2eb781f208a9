//! Win detection logic for tic-tac-toe.

use super::super::{Board, Player, Position};

const fn at(row: u8, col: u8) -> usize {
    (row * 3 + col) as usize
}

/// The 8 winning lines as board indices: 3 rows, 3 columns, 2 diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [at(0, 0), at(0, 1), at(0, 2)],
    [at(1, 0), at(1, 1), at(1, 2)],
    [at(2, 0), at(2, 1), at(2, 2)],
    // Columns
    [at(0, 0), at(1, 0), at(2, 0)],
    [at(0, 1), at(1, 1), at(2, 1)],
    [at(0, 2), at(1, 2), at(2, 2)],
    // Diagonals
    [at(0, 0), at(1, 1), at(2, 2)],
    [at(0, 2), at(1, 1), at(2, 0)],
];

/// Positions making up each winning line.
pub fn lines() -> impl Iterator<Item = [Position; 3]> {
    LINES.iter().filter_map(|[a, b, c]| {
        Some([
            Position::from_index(*a)?,
            Position::from_index(*b)?,
            Position::from_index(*c)?,
        ])
    })
}

/// Returns true if `player` holds all three cells of any line.
pub fn has_won(board: &Board, player: Player) -> bool {
    lines().any(|line| line.iter().all(|pos| board.get_cell(*pos) == Some(player)))
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has three in a row,
/// `None` otherwise.
pub fn check_winner(board: &Board) -> Option<Player> {
    [Player::X, Player::O]
        .into_iter()
        .find(|player| has_won(board, *player))
}
