//! Tic-tac-toe game state machine.
//!
//! [`GameState`] owns the 3x3 board, the mark to move, and the outcome.
//! It validates and applies moves, detects wins and draws, and converts
//! to and from a plain [`GameRecord`] so that callers can keep a game in
//! whatever session storage they like.
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{GameState, Mark, Outcome, load_or_default};
//!
//! let mut game = load_or_default(None)?;
//! assert!(game.apply_move(1, 1));
//! assert_eq!(game.turn(), Mark::O);
//! assert!(!game.apply_move(1, 1));
//!
//! let stored = game.to_value()?;
//! let restored = GameState::from_value(stored)?;
//! assert_eq!(restored.outcome(), Outcome::InProgress);
//! # Ok::<(), tictactoe_core::RecordError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod position;
mod record;
pub mod rules;
mod state;
mod types;

pub use error::{MoveError, RecordError};
pub use position::Position;
pub use record::{GameRecord, Winner};
pub use state::{GameState, load_or_default, reset};
pub use types::{Board, Cell, Mark, Outcome};
