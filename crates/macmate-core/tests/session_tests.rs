//! Session manager and persistence integration tests

use std::sync::Arc;

use async_trait::async_trait;

use macmate_core::session::persistence::{self, SavedSession};
use macmate_core::{
    ChatMessage, ChatSession, ModelClient, ModelTurn, Result, SessionConfig, SessionInput,
    SessionManager, SessionOutput, ToolDefinition, ToolRegistry,
};

/// Model that always answers immediately
struct EchoModel;

#[async_trait]
impl ModelClient for EchoModel {
    fn model(&self) -> &str {
        "echo"
    }

    async fn send(&self, history: &[ChatMessage], _tools: &[ToolDefinition]) -> Result<ModelTurn> {
        let last = history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ModelTurn::Answer(format!("echo: {}", last)))
    }
}

fn test_config() -> SessionConfig {
    SessionConfig::new(Arc::new(EchoModel), Arc::new(ToolRegistry::new()))
        .with_system_prompt("You are a test assistant.")
}

#[tokio::test]
async fn test_session_manager_creation() {
    let (manager, _output_rx) = SessionManager::new(test_config);
    assert_eq!(manager.session_count().await, 0);
    assert!(manager.list_sessions().await.is_empty());
}

#[tokio::test]
async fn test_push_message_creates_session() {
    let (manager, mut output_rx) = SessionManager::new(test_config);

    manager
        .push_message("alpha", SessionInput::user_message("hello"))
        .await
        .unwrap();

    assert!(manager.has_session("alpha").await);
    assert_eq!(manager.session_count().await, 1);

    // First output for a fresh session is Ready
    let (sid, output) = output_rx.recv().await.unwrap();
    assert_eq!(sid, "alpha");
    assert!(matches!(output, SessionOutput::Ready));

    // The turn runs to completion and ends Idle
    loop {
        let (_, output) = output_rx.recv().await.unwrap();
        match output {
            SessionOutput::AssistantMessage { content, .. } => {
                assert_eq!(content, "echo: hello");
            }
            SessionOutput::Idle => break,
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let (manager, mut output_rx) = SessionManager::new(test_config);

    manager
        .push_message("one", SessionInput::user_message("to one"))
        .await
        .unwrap();
    manager
        .push_message("two", SessionInput::user_message("to two"))
        .await
        .unwrap();

    assert_eq!(manager.session_count().await, 2);

    // Both sessions answer; outputs are tagged with their session id
    let mut answers = std::collections::HashMap::new();
    while answers.len() < 2 {
        let (sid, output) = output_rx.recv().await.unwrap();
        if let SessionOutput::AssistantMessage { content, .. } = output {
            answers.insert(sid, content);
        }
    }
    assert_eq!(answers["one"], "echo: to one");
    assert_eq!(answers["two"], "echo: to two");
}

#[tokio::test]
async fn test_stop_session() {
    let (manager, _output_rx) = SessionManager::new(test_config);

    manager
        .push_message("gone", SessionInput::user_message("hi"))
        .await
        .unwrap();
    assert!(manager.has_session("gone").await);

    manager.stop_session("gone").await.unwrap();
    assert!(!manager.has_session("gone").await);

    // Stopping a non-existent session is a no-op
    assert!(manager.stop_session("never-existed").await.is_ok());
}

#[test]
fn test_saved_session_round_trip() {
    let mut session = ChatSession::new(100);
    session.add_user_message("find me a drawing app");
    session.add_assistant_message("try drawio", vec![]);

    let saved = SavedSession {
        id: session.id.clone(),
        name: "round-trip".to_string(),
        messages: session.messages().to_vec(),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let json = serde_json::to_string_pretty(&saved).unwrap();
    let parsed: SavedSession = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.name, "round-trip");
    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].content, "find me a drawing app");
}

#[test]
fn test_persistence_save_load_delete() {
    // Uses the real data dir with a unique name, cleaned up at the end
    let name = format!("macmate-test-{}", uuid_suffix());

    let mut session = ChatSession::new(100);
    session.add_user_message("persist me");
    session.add_assistant_message("saved", vec![]);

    persistence::save_session(&name, &session).unwrap();
    assert!(persistence::list_sessions().unwrap().contains(&name));

    let loaded = persistence::load_session(&name).unwrap();
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.messages[1].content, "saved");

    assert!(persistence::delete_session(&name).unwrap());
    assert!(!persistence::delete_session(&name).unwrap());
}

#[test]
fn test_empty_session_is_not_saved() {
    let name = format!("macmate-test-empty-{}", uuid_suffix());
    let session = ChatSession::new(100);

    persistence::save_session(&name, &session).unwrap();
    assert!(!persistence::list_sessions().unwrap().contains(&name));
}

fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}-{}", std::process::id(), nanos)
}
