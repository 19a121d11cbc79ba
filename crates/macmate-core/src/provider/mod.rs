//! LLM provider abstraction
//!
//! The dispatcher only sees [`ModelClient`]: history plus a tool manifest
//! in, one [`ModelTurn`] out. The production implementation wraps the genai
//! framework; tests script their own turns.

mod genai_provider;

pub use genai_provider::GenAIProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::session::ChatMessage;
use crate::tools::ToolDefinition;

/// A tool invocation requested by the model.
///
/// Arguments come from the model and are untrusted; the executor validates
/// them against the tool's schema before anything runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One response from the model: either a final answer or tool-call requests
#[derive(Debug, Clone)]
pub enum ModelTurn {
    /// Final natural-language answer; the turn is complete
    Answer(String),
    /// The model wants tools run before it answers
    ToolCalls {
        /// Optional text emitted alongside the calls
        content: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

impl ModelTurn {
    pub fn is_final(&self) -> bool {
        matches!(self, ModelTurn::Answer(_))
    }
}

/// Trait for language-model clients
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for logging
    fn model(&self) -> &str;

    /// Send the conversation and tool manifest, receive one turn.
    ///
    /// Transport failures (network, rate limit, malformed response) surface
    /// as [`Error::ModelUnavailable`]; the dispatcher does not retry.
    async fn send(&self, history: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ModelTurn>;
}

/// Create the production model client from provider configuration
pub fn create_model_client(config: &ProviderConfig, system_prompt: &str) -> Result<Arc<dyn ModelClient>> {
    let api_key = config.get_api_key().ok_or_else(|| {
        Error::Config(format!(
            "No API key configured for provider '{}'; set it in the config file or the {} environment variable",
            config.provider_type,
            config
                .api_key_env
                .as_deref()
                .unwrap_or("provider API key")
        ))
    })?;

    let provider = GenAIProvider::with_api_key(&api_key, &config.model)
        .with_system_prompt(system_prompt);
    Ok(Arc::new(provider))
}
