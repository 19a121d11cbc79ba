//! GenAI-based model client implementation
//!
//! Uses the genai framework with manual tool control, so the dispatcher owns
//! the execution loop instead of the framework. Streaming is used to avoid
//! idle-connection timeouts on long completions; the stream is accumulated
//! into a single [`ModelTurn`] before returning.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatMessage as GenaiMessage, ChatRequest, ChatStreamEvent, Tool, ToolCall, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};
use genai::Client;
use genai::WebConfig;
use tracing::{debug, warn};

use super::{ModelClient, ModelTurn, ToolCallRequest};
use crate::error::{Error, Result};
use crate::session::{ChatMessage, Role};
use crate::tools::ToolDefinition;

/// A model client backed by genai
pub struct GenAIProvider {
    client: Client,
    model: String,
    system_prompt: Option<String>,
}

impl GenAIProvider {
    /// Default timeout for LLM API requests (5 minutes)
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    fn default_web_config() -> WebConfig {
        WebConfig::default()
            .with_timeout(Self::DEFAULT_TIMEOUT)
            .with_connect_timeout(Duration::from_secs(30))
    }

    /// Create a provider that resolves auth from environment variables
    pub fn new(model: &str) -> Self {
        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .build();
        Self {
            client,
            model: model.to_string(),
            system_prompt: None,
        }
    }

    /// Create a provider with a specific API key
    pub fn with_api_key(api_key: &str, model: &str) -> Self {
        let api_key = api_key.to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .with_auth_resolver(auth_resolver)
            .build();

        Self {
            client,
            model: model.to_string(),
            system_prompt: None,
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Convert session history into a genai ChatRequest
    fn build_request(&self, history: &[ChatMessage]) -> ChatRequest {
        let mut chat_req = ChatRequest::default();

        if let Some(system) = &self.system_prompt {
            chat_req = chat_req.with_system(system.as_str());
        }

        for msg in history {
            match msg.role {
                Role::System => {
                    chat_req = chat_req.append_message(GenaiMessage::system(msg.content.as_str()));
                }
                Role::User => {
                    chat_req = chat_req.append_message(GenaiMessage::user(msg.content.as_str()));
                }
                Role::Assistant => {
                    if msg.tool_calls.is_empty() {
                        chat_req =
                            chat_req.append_message(GenaiMessage::assistant(msg.content.as_str()));
                    } else {
                        // Tool calls must land in a single assistant message
                        // for OpenAI-compatible providers
                        let genai_calls: Vec<ToolCall> = msg
                            .tool_calls
                            .iter()
                            .map(|tc| ToolCall {
                                call_id: tc.call_id.clone(),
                                fn_name: tc.name.clone(),
                                fn_arguments: tc.arguments.clone(),
                                thought_signatures: None,
                            })
                            .collect();
                        chat_req = chat_req.append_message(genai_calls);
                    }
                }
                Role::Tool => {
                    if let Some(call_id) = &msg.tool_call_id {
                        let response = ToolResponse::new(call_id.clone(), msg.content.clone());
                        chat_req = chat_req.append_message(response);
                    } else {
                        warn!("tool message without call id dropped from request");
                    }
                }
            }
        }

        chat_req
    }
}

#[async_trait]
impl ModelClient for GenAIProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, history: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ModelTurn> {
        let mut chat_req = self.build_request(history);

        if !tools.is_empty() {
            let genai_tools: Vec<Tool> = tools
                .iter()
                .map(|t| {
                    Tool::new(&t.name)
                        .with_description(&t.description)
                        .with_schema(t.parameters.clone())
                })
                .collect();
            chat_req = chat_req.with_tools(genai_tools);
        }

        debug!(model = %self.model, messages = history.len(), tools = tools.len(), "sending chat request");

        let stream_response = self
            .client
            .exec_chat_stream(&self.model, chat_req, None)
            .await
            .map_err(|e| Error::ModelUnavailable(e.to_string()))?;

        let mut content = String::new();
        let mut calls: Vec<ToolCallRequest> = Vec::new();
        let mut stream = stream_response.stream;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    content.push_str(&chunk.content);
                }
                Ok(ChatStreamEvent::ToolCallChunk(tc)) => {
                    let tool_call = tc.tool_call;
                    calls.push(ToolCallRequest {
                        call_id: tool_call.call_id,
                        name: tool_call.fn_name,
                        arguments: tool_call.fn_arguments,
                    });
                }
                Ok(ChatStreamEvent::End(_)) => {
                    break;
                }
                Ok(ChatStreamEvent::Start)
                | Ok(ChatStreamEvent::ReasoningChunk(_))
                | Ok(ChatStreamEvent::ThoughtSignatureChunk(_)) => {}
                Err(e) => {
                    return Err(Error::ModelUnavailable(format!("stream error: {}", e)));
                }
            }
        }

        if calls.is_empty() {
            if content.is_empty() {
                return Err(Error::ModelUnavailable(
                    "model returned neither content nor tool calls".to_string(),
                ));
            }
            Ok(ModelTurn::Answer(content))
        } else {
            let content = if content.is_empty() { None } else { Some(content) };
            Ok(ModelTurn::ToolCalls { content, calls })
        }
    }
}
