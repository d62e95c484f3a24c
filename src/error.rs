//! Error types for the financial steward

use thiserror::Error;

/// Result type alias for steward operations
pub type Result<T> = std::result::Result<T, StewardError>;

#[derive(Error, Debug)]
pub enum StewardError {

    // =============================
    // Backend Errors
    // =============================

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // =============================
    // Agent Pipeline Errors
    // =============================

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Max tool rounds exceeded: {0}")]
    MaxToolRoundsExceeded(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
