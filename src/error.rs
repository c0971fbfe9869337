//! Error types for recite

use std::io;
use thiserror::Error;

/// Main error type for recite
#[derive(Error, Debug)]
pub enum ReciteError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for recite operations
pub type Result<T> = std::result::Result<T, ReciteError>;

impl From<String> for ReciteError {
    fn from(s: String) -> Self {
        ReciteError::Other(s)
    }
}

impl From<&str> for ReciteError {
    fn from(s: &str) -> Self {
        ReciteError::Other(s.to_string())
    }
}

impl From<nix::Error> for ReciteError {
    fn from(e: nix::Error) -> Self {
        ReciteError::Terminal(e.to_string())
    }
}
