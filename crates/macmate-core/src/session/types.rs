//! Session types for the dispatcher architecture
//!
//! These types define the input/output protocol between frontends and the
//! per-session dispatcher loops running in macmate-core.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::provider::ModelClient;
use crate::tools::ToolRegistry;

/// Unique identifier for a session
pub type SessionId = String;

/// Input messages sent TO a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionInput {
    /// User sends a message, starting a turn
    UserMessage { content: String },
    /// Clear the session's conversation history
    Reset,
}

impl SessionInput {
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
        }
    }

    pub fn reset() -> Self {
        Self::Reset
    }
}

/// Why a turn ended in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnFailure {
    /// Model transport fault (network, rate limit, malformed response)
    ModelUnavailable,
    /// The per-turn tool-call ceiling was hit
    CallLimitExceeded,
}

/// Output messages sent FROM a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionOutput {
    /// Session is ready to receive input
    Ready,
    /// Turn complete, session waiting for input
    Idle,
    /// Echo of user message (for UI display)
    UserMessage { id: String, content: String },
    /// Waiting on the model
    Thinking,
    /// Final assistant answer for the turn
    AssistantMessage { id: String, content: String },
    /// Tool execution starting
    ToolStart {
        id: String,
        name: String,
        arguments: serde_json::Value,
    },
    /// Tool execution completed
    ToolDone {
        id: String,
        name: String,
        success: bool,
        output: String,
    },
    /// The turn ended in failure; the session remains usable
    TurnFailed {
        reason: TurnFailure,
        message: String,
    },
    /// History was cleared by a reset
    HistoryCleared,
    /// Error outside the turn lifecycle
    Error { message: String },
}

impl SessionOutput {
    pub fn ready() -> Self {
        Self::Ready
    }

    pub fn idle() -> Self {
        Self::Idle
    }

    pub fn user_message(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::UserMessage {
            id: id.into(),
            content: content.into(),
        }
    }

    pub fn thinking() -> Self {
        Self::Thinking
    }

    pub fn assistant_message(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::AssistantMessage {
            id: id.into(),
            content: content.into(),
        }
    }

    pub fn tool_start(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolStart {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    pub fn tool_done(
        id: impl Into<String>,
        name: impl Into<String>,
        success: bool,
        output: impl Into<String>,
    ) -> Self {
        Self::ToolDone {
            id: id.into(),
            name: name.into(),
            success,
            output: output.into(),
        }
    }

    pub fn turn_failed(reason: TurnFailure, message: impl Into<String>) -> Self {
        Self::TurnFailed {
            reason,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Configuration for creating a session
///
/// The model client and tool registry are built once at startup and shared;
/// each session gets its own history and limits.
#[derive(Clone)]
pub struct SessionConfig {
    pub model: Arc<dyn ModelClient>,
    pub registry: Arc<ToolRegistry>,
    pub limits: LimitsConfig,
    /// System prompt seeded into new sessions
    pub system_prompt: Option<String>,
    /// Persist the session to disk when its loop ends
    pub save_session: bool,
}

impl SessionConfig {
    pub fn new(model: Arc<dyn ModelClient>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            registry,
            limits: LimitsConfig::default(),
            system_prompt: Some(super::chat::DEFAULT_SYSTEM_PROMPT.to_string()),
            save_session: false,
        }
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn without_system_prompt(mut self) -> Self {
        self.system_prompt = None;
        self
    }

    pub fn with_save_session(mut self, save: bool) -> Self {
        self.save_session = save;
        self
    }
}
