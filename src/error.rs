//! Crate-wide error type

use crate::llm::CompletionError;
use thiserror::Error;

/// Errors surfaced by the conversation core
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// True when the completion backend missed its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChatError::Completion(CompletionError::Timeout(_)))
    }
}

impl From<config::ConfigError> for ChatError {
    fn from(err: config::ConfigError) -> Self {
        ChatError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
