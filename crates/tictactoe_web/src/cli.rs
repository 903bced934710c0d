//! Command-line interface for tictactoe_web.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe in the browser, one game per session
#[derive(Parser, Debug)]
#[command(name = "tictactoe_web")]
#[command(about = "Serve a browser tic-tac-toe game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "tictactoe_web",
            "serve",
            "--config",
            "server.toml",
            "--port",
            "8080",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Serve {
                config: Some(PathBuf::from("server.toml")),
                host: None,
                port: Some(8080),
            }
        );
    }

    #[test]
    fn test_default_config_command() {
        let cli = Cli::try_parse_from(["tictactoe_web", "default-config"]).unwrap();
        assert_eq!(cli.command, Command::DefaultConfig);
    }

    #[test]
    fn test_bad_port_rejected() {
        assert!(Cli::try_parse_from(["tictactoe_web", "serve", "--port", "99999"]).is_err());
    }
}
