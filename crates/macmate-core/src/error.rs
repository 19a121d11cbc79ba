//! Error types for Macmate Core

use thiserror::Error;

/// Result type alias using Macmate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Macmate error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Tool call limit of {limit} exceeded for this turn")]
    CallLimitExceeded { limit: usize },

    #[error("Package manager error: {0}")]
    PackageManager(String),

    #[error("App control error: {0}")]
    AppControl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tool-specific errors
///
/// All of these surface as a failed `ToolResult` and are fed back to the
/// model; none of them terminate the turn or the session.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
