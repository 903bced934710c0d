//! Win detection for tic-tac-toe.

use crate::position::Position;
use crate::types::{Board, Cell, Mark};
use tracing::instrument;

/// The eight winning lines: three rows, three columns, then the main
/// diagonal and the anti-diagonal.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if `mark` holds all three cells of any line.
#[instrument(level = "trace", skip(board))]
pub fn has_won(board: &Board, mark: Mark) -> bool {
    let cell = Cell::from(mark);
    LINES
        .iter()
        .any(|line| line.iter().all(|pos| board.get(*pos) == cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(mark: Mark, positions: &[Position]) -> Board {
        let mut board = Board::new();
        for pos in positions {
            board.set(*pos, Cell::from(mark));
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert!(!has_won(&Board::new(), Mark::X));
        assert!(!has_won(&Board::new(), Mark::O));
    }

    #[test]
    fn test_every_line_wins() {
        for line in LINES {
            for mark in [Mark::X, Mark::O] {
                let board = board_with(mark, &line);
                assert!(has_won(&board, mark), "{mark} should win on {line:?}");
                assert!(!has_won(&board, mark.opponent()));
            }
        }
    }

    #[test]
    fn test_l_shape_does_not_win() {
        let board = board_with(
            Mark::X,
            &[Position::TopLeft, Position::MiddleLeft, Position::BottomCenter],
        );
        assert!(!has_won(&board, Mark::X));
    }

    #[test]
    fn test_broken_line_does_not_win() {
        let board = Board::from_rows([
            [Cell::X, Cell::O, Cell::X],
            [Cell::Empty; 3],
            [Cell::Empty; 3],
        ]);
        assert!(!has_won(&board, Mark::X));
        assert!(!has_won(&board, Mark::O));
    }

    #[test]
    fn test_only_eight_lines_win() {
        // Every 3-cell subset that is not one of LINES must not win.
        let mut winning = 0;
        for a in 0..9 {
            for b in (a + 1)..9 {
                for c in (b + 1)..9 {
                    let cells: Vec<Position> = [a, b, c]
                        .into_iter()
                        .filter_map(Position::from_index)
                        .collect();
                    if has_won(&board_with(Mark::O, &cells), Mark::O) {
                        winning += 1;
                    }
                }
            }
        }
        assert_eq!(winning, 8);
    }
}
