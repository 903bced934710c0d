//! Browser tic-tac-toe server.
//!
//! Keeps one [`tictactoe_core::GameState`] per browser session and
//! exposes it over a small JSON API next to a single-page UI.
//!
//! # Architecture
//!
//! - **Server**: axum routes that read, move, and reset
//! - **Session**: cookie ids mapped to stored game records, one
//!   load/operate/store cycle at a time per session
//! - **Config**: TOML settings with environment and CLI overrides
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_web::{AppState, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let app = router(AppState::from_config(&config));
//! let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod server;
mod session;

pub use config::ServerConfig;
pub use error::{ApiError, ConfigError, SessionError};
pub use server::{AppState, MoveRequest, MoveResponse, ResetResponse, Session, router};
pub use session::{MemoryStore, SessionId, SessionManager, SessionStore};
