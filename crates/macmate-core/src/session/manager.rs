//! Session manager for multi-session orchestration
//!
//! Routes inputs to per-session dispatcher tasks and funnels their outputs
//! into one channel. Sessions are independent; each has its own history and
//! processes its inputs serially.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use super::dispatcher::Dispatcher;
use super::types::{SessionConfig, SessionId, SessionInput, SessionOutput};
use crate::error::{Error, Result};

/// Factory function type for creating session configs
pub type ConfigFactory = Arc<dyn Fn() -> SessionConfig + Send + Sync>;

/// Type alias for the output receiver
pub type OutputReceiver = mpsc::Receiver<(SessionId, SessionOutput)>;

/// Manages multiple concurrent sessions
pub struct SessionManager {
    /// Map of session ID to input sender
    sessions: Arc<RwLock<HashMap<SessionId, mpsc::Sender<SessionInput>>>>,
    /// Channel for all session outputs (session_id, output)
    output_tx: mpsc::Sender<(SessionId, SessionOutput)>,
    /// Factory for creating session configs
    config_factory: ConfigFactory,
}

impl SessionManager {
    /// Create a new session manager with the given config factory.
    ///
    /// Returns the manager and an output receiver for consuming session
    /// outputs. The factory is called once per new session.
    pub fn new<F>(config_factory: F) -> (Self, OutputReceiver)
    where
        F: Fn() -> SessionConfig + Send + Sync + 'static,
    {
        let (output_tx, output_rx) = mpsc::channel(256);

        let manager = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            output_tx,
            config_factory: Arc::new(config_factory),
        };

        (manager, output_rx)
    }

    /// Push a message to a session, creating the session if needed
    pub async fn push_message(&self, session_id: &str, input: SessionInput) -> Result<()> {
        let session_id = session_id.to_string();

        let tx = {
            let sessions = self.sessions.read().await;
            sessions.get(&session_id).cloned()
        };

        let tx = match tx {
            Some(tx) => tx,
            None => self.create_session(&session_id).await?,
        };

        tx.send(input)
            .await
            .map_err(|e| Error::Session(format!("failed to send input: {}", e)))?;

        Ok(())
    }

    /// Create a new session with the given ID, returning its input sender
    async fn create_session(&self, session_id: &str) -> Result<mpsc::Sender<SessionInput>> {
        let session_id = session_id.to_string();
        info!(session = %session_id, "creating session");

        let (input_tx, input_rx) = mpsc::channel(256);

        let config = (self.config_factory)();
        let dispatcher = Dispatcher::new(session_id.clone(), config, self.output_tx.clone());

        let sid = session_id.clone();
        tokio::spawn(async move {
            dispatcher.run(input_rx).await;
            debug!(session = %sid, "dispatcher task ended");
        });

        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session_id.clone(), input_tx.clone());
        }

        let _ = self
            .output_tx
            .send((session_id, SessionOutput::ready()))
            .await;

        Ok(input_tx)
    }

    /// List active session IDs
    pub async fn list_sessions(&self) -> Vec<SessionId> {
        let sessions = self.sessions.read().await;
        sessions.keys().cloned().collect()
    }

    /// Check if a session exists
    pub async fn has_session(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions.contains_key(session_id)
    }

    /// Stop a session by dropping its input sender; the dispatcher detects
    /// the closed channel, saves if configured, and exits.
    pub async fn stop_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(session_id).is_some() {
            info!(session = %session_id, "stopped session");
        }
        Ok(())
    }

    /// Stop all sessions
    pub async fn stop_all(&self) -> Result<()> {
        let session_ids: Vec<String> = {
            let sessions = self.sessions.read().await;
            sessions.keys().cloned().collect()
        };

        for session_id in session_ids {
            self.stop_session(&session_id).await?;
        }

        Ok(())
    }

    /// Number of active sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
