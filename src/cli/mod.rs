//! Line-oriented shell that drives one wizard at a time.

mod commands;
pub mod output;
mod shell;

use thiserror::Error;

use crate::errors::{CatalogError, ConfigError, WizardError};

pub use commands::{ShellContext, COMMANDS};
pub use shell::{parse_command_line, run_cli, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell failures.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Per-command failures, reported and then the shell carries on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("No active flow. Start one with `flow <crypto-sell|crypto-buy|giftcard-sell|giftcard-buy>`.")]
    NoActiveFlow,
    #[error("Unknown command `{command}`{hint}")]
    Unknown { command: String, hint: String },
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
