//! Macmate Core - an LLM-mediated assistant for macOS automation
//!
//! This crate provides the core of the Macmate assistant:
//! - Tool system wrapping Homebrew and AppleScript collaborators
//! - Tool executor with schema validation and per-tool timeouts
//! - The bounded tool-call dispatcher loop
//! - Multi-session management with per-session history

pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod provider;
pub mod session;
pub mod system;
pub mod tools;

pub use config::{Config, ConfigManager, LimitsConfig, PackageConfig, ProviderConfig};
pub use domain::{License, Package, PackageKind, SearchResult};
pub use error::{Error, Result, ToolError};
pub use executor::{ToolExecutor, ToolResult};
pub use provider::{create_model_client, GenAIProvider, ModelClient, ModelTurn, ToolCallRequest};
pub use session::{
    ChatMessage, ChatSession, Dispatcher, Role, SessionConfig, SessionId, SessionInput,
    SessionManager, SessionOutput, TurnFailure, TurnOutcome, TurnPhase, DEFAULT_SYSTEM_PROMPT,
};
pub use system::{create_package_manager, AppController, PackageManager};
pub use tools::{Tool, ToolDefinition, ToolOutput, ToolRegistry, ToolRegistryBuilder};
