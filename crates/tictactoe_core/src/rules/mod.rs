//! Rule checks for tic-tac-toe.
//!
//! Rules are pure functions over a [`Board`](crate::Board) and are kept
//! apart from the state machine that applies them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, has_won};
