//! The tic-tac-toe state machine.

use crate::error::{MoveError, RecordError};
use crate::position::Position;
use crate::record::GameRecord;
use crate::rules;
use crate::types::{Board, Cell, Mark, Outcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Complete state of one game: board, mark to move, and outcome.
///
/// States move `InProgress -> Won(_) | Draw` only through successful
/// moves. Finished games are never mutated again; start over with
/// [`reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GameRecord", into = "GameRecord")]
pub struct GameState {
    board: Board,
    turn: Mark,
    outcome: Outcome,
}

impl GameState {
    /// Creates a fresh game: empty board, X to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from optional parts, defaulting whatever is missing.
    ///
    /// The parts are trusted as-is; nothing checks that `outcome` agrees
    /// with the board.
    pub fn from_parts(board: Option<Board>, turn: Option<Mark>, outcome: Option<Outcome>) -> Self {
        Self {
            board: board.unwrap_or_default(),
            turn: turn.unwrap_or_default(),
            outcome: outcome.unwrap_or_default(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark to move next (stale once the game is over).
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Returns the outcome so far.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Checks if the game has ended.
    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    /// Returns the cell at `(row, col)`, or `None` when off the board.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        Position::from_coords(row, col).map(|pos| self.board.get(pos))
    }

    /// Plays the current mark at `(row, col)`.
    ///
    /// Returns `false` and leaves the state untouched when the move is
    /// rejected; see [`GameState::try_move`] for the reason.
    pub fn apply_move(&mut self, row: usize, col: usize) -> bool {
        self.try_move(row, col).is_ok()
    }

    /// Plays the current mark at `(row, col)`, reporting why a move fails.
    ///
    /// On success the mover's win is checked first, then a full board;
    /// the turn only passes to the opponent when neither holds.
    ///
    /// # Errors
    ///
    /// - [`MoveError::OutOfBounds`] if `row` or `col` is not in 0-2.
    /// - [`MoveError::CellOccupied`] if the cell already holds a mark.
    /// - [`MoveError::GameOver`] if the game has already ended.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn try_move(&mut self, row: usize, col: usize) -> Result<Outcome, MoveError> {
        let pos = Position::from_coords(row, col).ok_or(MoveError::OutOfBounds { row, col })?;

        if !self.board.is_empty(pos) {
            warn!(position = %pos, "Cell already occupied");
            return Err(MoveError::CellOccupied(pos));
        }
        if self.is_over() {
            warn!(outcome = %self.outcome, "Move after game over");
            return Err(MoveError::GameOver);
        }

        let mover = self.turn;
        self.board.set(pos, Cell::from(mover));

        if self.check_win(mover) {
            self.outcome = Outcome::Won(mover);
        } else if self.is_draw() {
            self.outcome = Outcome::Draw;
        } else {
            self.turn = mover.opponent();
        }

        debug!(
            position = %pos,
            mover = %mover,
            outcome = %self.outcome,
            board = %self.board,
            "Move applied"
        );
        Ok(self.outcome)
    }

    /// Checks if `mark` holds any full row, column, or diagonal.
    pub fn check_win(&self, mark: Mark) -> bool {
        rules::has_won(&self.board, mark)
    }

    /// Checks if the board is full while no outcome has been recorded yet.
    pub fn is_draw(&self) -> bool {
        rules::is_full(&self.board) && !self.is_over()
    }

    /// Converts the state into its plain record.
    pub fn to_record(&self) -> GameRecord {
        GameRecord::from(self.clone())
    }

    /// Rebuilds a state from a record.
    pub fn from_record(record: GameRecord) -> Self {
        Self::from(record)
    }

    /// Serializes the state to an opaque JSON value for session storage.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, RecordError> {
        Ok(serde_json::to_value(self.to_record())?)
    }

    /// Parses a state from a stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the value is not a valid game record.
    #[instrument(skip(value))]
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        let record: GameRecord = serde_json::from_value(value).inspect_err(|e| {
            warn!(error = %e, "Rejecting malformed game record");
        })?;
        Ok(Self::from_record(record))
    }
}

/// Parses the stored record if there is one, otherwise starts a fresh game.
///
/// # Errors
///
/// Returns [`RecordError`] if a stored record is present but malformed.
#[instrument(skip(stored), fields(present = stored.is_some()))]
pub fn load_or_default(stored: Option<serde_json::Value>) -> Result<GameState, RecordError> {
    match stored {
        Some(value) => GameState::from_value(value),
        None => {
            debug!("No stored game, starting fresh");
            Ok(GameState::new())
        }
    }
}

/// Starts a brand-new game.
pub fn reset() -> GameState {
    GameState::new()
}

impl From<GameRecord> for GameState {
    fn from(record: GameRecord) -> Self {
        Self::from_parts(
            Some(record.board),
            Some(record.current),
            Some(record.winner.map(Outcome::from).unwrap_or_default()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &mut GameState, moves: &[(usize, usize)]) {
        for &(row, col) in moves {
            assert!(state.apply_move(row, col), "move ({row}, {col}) rejected");
        }
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();
        assert_eq!(state.turn(), Mark::X);
        assert_eq!(state.outcome(), Outcome::InProgress);
        assert_eq!(state.board(), &Board::new());
    }

    #[test]
    fn test_make_move_and_switch() {
        let mut state = GameState::new();
        assert!(state.apply_move(0, 0));
        assert_eq!(state.cell(0, 0), Some(Cell::X));
        assert_eq!(state.turn(), Mark::O);
        assert!(state.apply_move(1, 1));
        assert_eq!(state.cell(1, 1), Some(Cell::O));
        assert_eq!(state.turn(), Mark::X);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut state = GameState::new();
        play(&mut state, &[(0, 0)]);
        let before = state.clone();
        assert_eq!(
            state.try_move(0, 0),
            Err(MoveError::CellOccupied(Position::TopLeft))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut state = GameState::new();
        assert_eq!(
            state.try_move(3, 0),
            Err(MoveError::OutOfBounds { row: 3, col: 0 })
        );
        assert!(!state.apply_move(0, 7));
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_winner_keeps_turn() {
        let mut state = GameState::new();
        play(&mut state, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(state.outcome(), Outcome::Won(Mark::X));
        assert_eq!(state.turn(), Mark::X);
    }

    #[test]
    fn test_occupied_checked_before_game_over() {
        let mut state = GameState::new();
        play(&mut state, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(
            state.try_move(0, 0),
            Err(MoveError::CellOccupied(Position::TopLeft))
        );
        assert_eq!(state.try_move(2, 2), Err(MoveError::GameOver));
    }

    #[test]
    fn test_is_draw_false_once_outcome_recorded() {
        let board = Board::from_rows([[Cell::X; 3]; 3]);
        let won = GameState::from_parts(Some(board.clone()), None, Some(Outcome::Won(Mark::X)));
        assert!(!won.is_draw());
        let pending = GameState::from_parts(Some(board), None, None);
        assert!(pending.is_draw());
    }

    #[test]
    fn test_from_parts_defaults() {
        assert_eq!(GameState::from_parts(None, None, None), GameState::new());
        let state = GameState::from_parts(None, Some(Mark::O), None);
        assert_eq!(state.turn(), Mark::O);
        assert_eq!(state.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_load_or_default_without_record() {
        assert_eq!(load_or_default(None).unwrap(), GameState::new());
    }

    #[test]
    fn test_reset_is_fresh() {
        assert_eq!(reset(), GameState::new());
    }
}
