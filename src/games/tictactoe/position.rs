//! Board coordinates for tic-tac-toe moves.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Error constructing a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PositionError {
    /// Row or column outside `0..=2`.
    #[display("Position ({row}, {col}) is outside the 3x3 grid")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

impl std::error::Error for PositionError {}

/// A cell coordinate on the board, row and column each in `0..=2`.
///
/// The only way to obtain a `Position` is through a bounds-checked
/// constructor, so every board operation taking one is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

/// Unchecked wire form of a position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawPosition {
    /// Row, 0 = top.
    pub row: usize,
    /// Column, 0 = left.
    pub col: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        RawPosition {
            row: pos.row(),
            col: pos.col(),
        }
    }
}

impl Position {
    /// Creates a position, failing if either coordinate is off the board.
    #[instrument]
    pub fn new(row: usize, col: usize) -> Result<Self, PositionError> {
        if row > 2 || col > 2 {
            return Err(PositionError::OutOfRange { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Creates a position from a row-major board index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row, 0 = top.
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Column, 0 = left.
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major board index (0-8).
    pub fn index(self) -> usize {
        self.row() * 3 + self.col()
    }

    /// The centre cell.
    pub const CENTER: Position = Position { row: 1, col: 1 };

    /// The four corner cells.
    pub const CORNERS: [Position; 4] = [
        Position { row: 0, col: 0 },
        Position { row: 0, col: 2 },
        Position { row: 2, col: 0 },
        Position { row: 2, col: 2 },
    ];

    /// All 9 positions in row-major order.
    pub const ALL: [Position; 9] = [
        Position { row: 0, col: 0 },
        Position { row: 0, col: 1 },
        Position { row: 0, col: 2 },
        Position { row: 1, col: 0 },
        Position { row: 1, col: 1 },
        Position { row: 1, col: 2 },
        Position { row: 2, col: 0 },
        Position { row: 2, col: 1 },
        Position { row: 2, col: 2 },
    ];
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
