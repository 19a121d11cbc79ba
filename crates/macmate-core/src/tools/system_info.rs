//! System query tools

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::system::AppController;
use crate::tools::{Tool, ToolOutput};

fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

/// Report macOS version information
pub struct GetSystemInfo {
    controller: Arc<AppController>,
}

impl GetSystemInfo {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for GetSystemInfo {
    fn name(&self) -> &str {
        "get_system_info"
    }

    fn description(&self) -> &str {
        "Get macOS system information, including the OS version."
    }

    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        let version = self
            .controller
            .macos_version()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "system": "macOS",
            "macos_version": version
        })))
    }
}

/// Open the notification settings pane for the user.
///
/// Notification permissions cannot be toggled programmatically on modern
/// macOS, so this tool lands the user on the right pane instead.
pub struct OpenNotificationSettings {
    controller: Arc<AppController>,
}

impl OpenNotificationSettings {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for OpenNotificationSettings {
    fn name(&self) -> &str {
        "open_notification_settings"
    }

    fn description(&self) -> &str {
        "Open the Notifications pane of System Settings so the user can change notification permissions. Permissions cannot be changed without manual action."
    }

    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        self.controller
            .open_notification_settings()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "message": "Opened the Notifications settings pane; ask the user to adjust permissions there"
        })))
    }
}
