//! Plain serializable form of a game, as kept in session storage.
//!
//! Wire shape:
//!
//! ```json
//! { "board": [["X", "", "O"], ["", "X", ""], ["", "", ""]],
//!   "current": "O",
//!   "winner": null }
//! ```

use crate::state::GameState;
use crate::types::{Board, Mark, Outcome};
use serde::{Deserialize, Serialize};

/// Terminal result as it appears in a record's `winner` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// The board filled with no line.
    Draw,
}

impl From<Winner> for Outcome {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::X => Outcome::Won(Mark::X),
            Winner::O => Outcome::Won(Mark::O),
            Winner::Draw => Outcome::Draw,
        }
    }
}

impl Winner {
    /// Converts an outcome, `None` while the game is still in progress.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::InProgress => None,
            Outcome::Won(Mark::X) => Some(Winner::X),
            Outcome::Won(Mark::O) => Some(Winner::O),
            Outcome::Draw => Some(Winner::Draw),
        }
    }
}

/// The record a session store persists for one game.
///
/// Missing keys fall back to a fresh game's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Rows of cells.
    #[serde(default)]
    pub board: Board,
    /// Mark to move next.
    #[serde(default)]
    pub current: Mark,
    /// Outcome once the game has ended.
    #[serde(default)]
    pub winner: Option<Winner>,
}

impl From<GameState> for GameRecord {
    fn from(state: GameState) -> Self {
        Self {
            board: state.board().clone(),
            current: state.turn(),
            winner: Winner::from_outcome(state.outcome()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_record_shape() {
        let value = serde_json::to_value(GameRecord::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "board": [["", "", ""], ["", "", ""], ["", "", ""]],
                "current": "X",
                "winner": null,
            })
        );
    }

    #[test]
    fn test_missing_keys_default() {
        let record: GameRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record, GameRecord::default());
    }

    #[test]
    fn test_winner_values() {
        let record: GameRecord = serde_json::from_value(json!({
            "board": [["X", "X", "X"], ["O", "O", ""], ["", "", ""]],
            "current": "X",
            "winner": "X",
        }))
        .unwrap();
        assert_eq!(record.winner, Some(Winner::X));
        assert_eq!(Outcome::from(Winner::Draw), Outcome::Draw);
        assert_eq!(Winner::from_outcome(Outcome::InProgress), None);
    }

    #[test]
    fn test_bad_winner_rejected() {
        let result = serde_json::from_value::<GameRecord>(json!({ "winner": "Nobody" }));
        assert!(result.is_err());
    }
}
