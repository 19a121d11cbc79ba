//! Chat session state
//!
//! The ordered message history replayed to the model each turn. Insertion
//! order is the model's only memory, so appends are the sole mutation and
//! reads never reorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ToolCallRequest;

/// Default system prompt for the assistant
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are Macmate, an assistant for macOS software management and system control.

You can:
1. Search for and recommend software packages, preferring free and open-source
   options with clear licenses.
2. Install and uninstall packages. These are sensitive operations: always
   confirm with the user before invoking them.
3. Control macOS applications (open, quit, check status, list running apps).
4. Report system information and guide the user to notification settings.

Be concise and friendly. When a tool call fails, explain what happened and
suggest an alternative rather than retrying the same call blindly.";

/// Message role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique ID for this message
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Tool calls requested by this message (assistant only)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// For tool messages: the call this result answers
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// A tool result message answering `tool_call_id`
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// A chat session containing conversation history
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Unique session ID
    pub id: String,
    /// Conversation messages, in append order
    messages: Vec<ChatMessage>,
    /// Retention cap; oldest non-system messages are dropped when a new
    /// user message pushes past it. Never applied mid-turn.
    max_history: usize,
}

impl ChatSession {
    pub fn new(max_history: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            max_history,
        }
    }

    /// Create a session seeded with a system prompt
    pub fn with_system_prompt(system_prompt: impl Into<String>, max_history: usize) -> Self {
        let mut session = Self::new(max_history);
        session.messages.push(ChatMessage::system(system_prompt));
        session
    }

    /// Add a user message, applying the retention cap first
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.apply_retention();
        self.messages.push(ChatMessage::user(content));
    }

    /// Add an assistant message, with any tool calls it requested
    pub fn add_assistant_message(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) {
        if tool_calls.is_empty() {
            self.messages.push(ChatMessage::assistant(content));
        } else {
            self.messages
                .push(ChatMessage::assistant_with_tools(content, tool_calls));
        }
    }

    /// Add a tool result message
    pub fn add_tool_result(&mut self, tool_call_id: &str, content: impl Into<String>) {
        self.messages
            .push(ChatMessage::tool_result(tool_call_id, content));
    }

    /// Ordered read view of the history
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Clear conversation history. The system prompt, if any, survives: it
    /// is session configuration, not conversation memory.
    pub fn clear(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of user turns so far
    pub fn turn_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Restore messages from a saved session
    pub fn restore(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    fn apply_retention(&mut self) {
        while self.messages.len() >= self.max_history {
            let Some(idx) = self.messages.iter().position(|m| m.role != Role::System) else {
                break;
            };
            self.messages.remove(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_order_preserved() {
        let mut session = ChatSession::new(100);
        session.add_user_message("one");
        session.add_assistant_message("two", vec![]);
        session.add_tool_result("call-1", "three");
        session.add_user_message("four");

        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_clear_keeps_system_prompt() {
        let mut session = ChatSession::with_system_prompt("be helpful", 100);
        for i in 0..10 {
            session.add_user_message(format!("msg {}", i));
        }
        assert_eq!(session.message_count(), 11);

        session.clear();
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].role, Role::System);
    }

    #[test]
    fn test_clear_without_system_prompt_empties_history() {
        let mut session = ChatSession::new(100);
        for i in 0..10 {
            session.add_user_message(format!("msg {}", i));
        }
        session.clear();
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn test_retention_drops_oldest_non_system() {
        let mut session = ChatSession::with_system_prompt("prompt", 4);
        session.add_user_message("a");
        session.add_assistant_message("b", vec![]);
        session.add_user_message("c");
        // Cap of 4 reached; the next user append drops "a"
        session.add_user_message("d");

        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["prompt", "b", "c", "d"]);
    }

    #[test]
    fn test_tool_call_round_trip() {
        let call = ToolCallRequest::new("call-9", "open_app", json!({"app_name": "Safari"}));
        let msg = ChatMessage::assistant_with_tools("", vec![call]);

        let serialized = serde_json::to_string(&msg).unwrap();
        let parsed: ChatMessage = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "open_app");
    }
}
