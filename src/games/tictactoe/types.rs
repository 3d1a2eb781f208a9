//! Core domain types for tic-tac-toe.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Wire tag for this player (`"X"` or `"O"`).
    pub fn tag(self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }

    /// Parses a wire tag. Anything other than `"X"` or `"O"` yields `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "X" => Some(Player::X),
            "O" => Some(Player::O),
            _ => None,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Row-major export of a board: `rows[row][col]`.
pub type BoardRows = [[Option<Player>; 3]; 3];

/// 3x3 tic-tac-toe board.
///
/// Cells are stored flat in row-major order. There is no way to clear a
/// cell once marked; the board only grows until the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Player>; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    /// Returns true when no cell is marked.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Returns true when the cell at `pos` holds no mark.
    pub fn is_cell_empty(&self, pos: Position) -> bool {
        self.cells[pos.index()].is_none()
    }

    /// Returns the mark at `pos`, if any.
    pub fn get_cell(&self, pos: Position) -> Option<Player> {
        self.cells[pos.index()]
    }

    /// Marks the cell at `pos`.
    ///
    /// This is unchecked with respect to game rules; the [`Game`](super::Game)
    /// gates every call through move validation.
    pub fn set_cell(&mut self, pos: Position, player: Player) {
        self.cells[pos.index()] = Some(player);
    }

    /// Returns true when every cell is marked.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|pos| self.is_cell_empty(*pos))
            .collect()
    }

    /// Number of marks placed by `player`.
    pub fn count(&self, player: Player) -> usize {
        self.cells.iter().filter(|c| **c == Some(player)).count()
    }

    /// Exports the grid as rows for serialization.
    pub fn to_rows(&self) -> BoardRows {
        let mut rows = [[None; 3]; 3];
        for pos in Position::ALL {
            rows[pos.row()][pos.col()] = self.get_cell(pos);
        }
        rows
    }

    /// Rebuilds a board from a row export.
    pub fn from_rows(rows: &BoardRows) -> Self {
        let mut board = Self::new();
        for pos in Position::ALL {
            if let Some(player) = rows[pos.row()][pos.col()] {
                board.set_cell(pos, player);
            }
        }
        board
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let idx = row * 3 + col;
                let symbol = match self.cells[idx] {
                    None => (idx + 1).to_string(),
                    Some(player) => player.tag().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Win,
    /// Game ended in a draw.
    Draw,
}

impl GameStatus {
    /// Returns true for `Win` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}
