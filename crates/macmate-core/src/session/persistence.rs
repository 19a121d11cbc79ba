//! Session persistence
//!
//! Sessions are saved as JSON under the platform data directory so a chat
//! can be resumed after a restart. Saving is best-effort: a failed save is
//! logged by the caller, never fatal.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::{ChatMessage, ChatSession};
use crate::error::{Error, Result};

/// A session as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    pub id: String,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directory where sessions are stored (~/.local/share/macmate/sessions)
pub fn sessions_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Session("could not find data directory".to_string()))?;
    Ok(data_dir.join("macmate").join("sessions"))
}

fn session_path(name: &str) -> Result<PathBuf> {
    Ok(sessions_dir()?.join(format!("{}.json", name)))
}

/// Save a session under the given name. Empty sessions are skipped.
pub fn save_session(name: &str, session: &ChatSession) -> Result<()> {
    if session.messages().is_empty() {
        return Ok(());
    }

    let dir = sessions_dir()?;
    std::fs::create_dir_all(&dir)?;

    let now = Utc::now();
    let saved = SavedSession {
        id: session.id.clone(),
        name: name.to_string(),
        messages: session.messages().to_vec(),
        created_at: session
            .messages()
            .first()
            .map(|m| m.timestamp)
            .unwrap_or(now),
        updated_at: now,
    };

    let json = serde_json::to_string_pretty(&saved)?;
    std::fs::write(session_path(name)?, json)?;
    Ok(())
}

/// Load a saved session by name
pub fn load_session(name: &str) -> Result<SavedSession> {
    let path = session_path(name)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Session(format!("cannot read session '{}': {}", name, e)))?;
    let saved: SavedSession = serde_json::from_str(&content)
        .map_err(|e| Error::Session(format!("session file '{}' is corrupt: {}", name, e)))?;
    Ok(saved)
}

/// List the names of all saved sessions
pub fn list_sessions() -> Result<Vec<String>> {
    let dir = sessions_dir()?;
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem().map(|s| s.to_string_lossy().to_string())
            } else {
                None
            }
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Delete a saved session; Ok(false) if it did not exist
pub fn delete_session(name: &str) -> Result<bool> {
    let path = session_path(name)?;
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path)?;
    Ok(true)
}
