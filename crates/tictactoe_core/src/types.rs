//! Core domain types for tic-tac-toe.

use crate::position::Position;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A player's mark.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Mark {
    /// Mark X (moves first).
    #[default]
    X,
    /// Mark O (moves second).
    O,
}

impl Mark {
    /// Returns the opponent's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Contents of one board cell.
///
/// On the wire an empty cell is `""`, occupied cells are `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// Occupied by X.
    X,
    /// Occupied by O.
    O,
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    /// Checks if the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// 3x3 tic-tac-toe board, stored row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Board {
    rows: [[Cell; 3]; 3],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit rows.
    pub fn from_rows(rows: [[Cell; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.rows[pos.row()][pos.col()]
    }

    /// Sets the cell at the given position.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.rows[pos.row()][pos.col()] = cell;
    }

    /// Checks if the cell at a position is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_empty()
    }

    /// Returns the rows of the board.
    pub fn rows(&self) -> &[[Cell; 3]; 3] {
        &self.rows
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().flatten().copied()
    }
}

// A null, missing or empty row list means "no board yet", anything else must be 3x3.
impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Option::<Vec<[Cell; 3]>>::deserialize(deserializer)?.unwrap_or_default();
        match <[[Cell; 3]; 3]>::try_from(rows) {
            Ok(rows) => Ok(Self { rows }),
            Err(rows) if rows.is_empty() => Ok(Self::new()),
            Err(rows) => Err(de::Error::invalid_length(rows.len(), &"3 rows of 3 cells")),
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Empty => write!(f, "{}", r * 3 + c + 1)?,
                    Cell::X => write!(f, "X")?,
                    Cell::O => write!(f, "O")?,
                }
                if c < 2 {
                    write!(f, "|")?;
                }
            }
            if r < 2 {
                write!(f, "\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

/// Result of the game so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// Game is ongoing.
    #[default]
    #[display("in progress")]
    InProgress,
    /// Game ended with three in a row.
    #[display("{_0} wins")]
    Won(Mark),
    /// Board filled up with no winner.
    #[display("draw")]
    Draw,
}

impl Outcome {
    /// Checks if the game has ended.
    pub fn is_over(self) -> bool {
        self != Outcome::InProgress
    }

    /// Returns the winning mark, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::Won(mark) => Some(mark),
            _ => None,
        }
    }
}
