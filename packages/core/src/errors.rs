//! Error types for the grid engine
//!
//! Only programmer errors surface here. Operations skipped by policy
//! (locked rows, empty history, no active cell, no `on_change`) return
//! normally instead.

use datagrid_state::StateError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Command already registered: {0}")]
    DuplicateCommand(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command {id} failed: {message}")]
    CommandFailed { id: String, message: String },

    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Malformed id: {0}")]
    MalformedId(String),

    #[error("Not a cell id: {0}")]
    NotACellId(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl GridError {
    /// Failure raised from inside a command body
    pub fn command_failed(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        GridError::CommandFailed {
            id: id.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Config(e.to_string())
    }
}

pub type GridResult<T> = Result<T, GridError>;
