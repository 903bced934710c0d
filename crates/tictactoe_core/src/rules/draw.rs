//! Full-board detection.

use crate::types::Board;
use tracing::instrument;

/// Checks if every cell on the board is occupied.
#[instrument(level = "trace", skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().all(|cell| !cell.is_empty())
}
