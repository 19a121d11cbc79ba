//! Application control tools
//!
//! Thin schema wrappers over [`AppController`]. These are interactive
//! operations, so their time budgets are tighter than the package tools'.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::system::AppController;
use crate::tools::{Tool, ToolOutput};

const APP_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

fn required_app_name(params: &Value) -> Result<&str, ToolError> {
    params["app_name"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments("app_name must be a non-empty string".into()))
}

fn app_name_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_name": {
                "type": "string",
                "description": "Application name, e.g. 'Safari' or 'Visual Studio Code'"
            }
        },
        "required": ["app_name"]
    })
}

/// Open a macOS application
pub struct OpenApp {
    controller: Arc<AppController>,
}

impl OpenApp {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for OpenApp {
    fn name(&self) -> &str {
        "open_app"
    }

    fn description(&self) -> &str {
        "Open (activate) a macOS application by name."
    }

    fn parameters_schema(&self) -> Value {
        app_name_schema()
    }

    fn timeout(&self) -> Duration {
        APP_TOOL_TIMEOUT
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let app_name = required_app_name(&params)?;

        self.controller
            .open_app(app_name)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "app_name": app_name,
            "message": format!("Opened {}", app_name)
        })))
    }
}

/// Quit a macOS application
pub struct QuitApp {
    controller: Arc<AppController>,
}

impl QuitApp {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for QuitApp {
    fn name(&self) -> &str {
        "quit_app"
    }

    fn description(&self) -> &str {
        "Quit a macOS application gracefully by name."
    }

    fn parameters_schema(&self) -> Value {
        app_name_schema()
    }

    fn timeout(&self) -> Duration {
        APP_TOOL_TIMEOUT
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let app_name = required_app_name(&params)?;

        self.controller
            .quit_app(app_name)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "app_name": app_name,
            "message": format!("Quit {}", app_name)
        })))
    }
}

/// Check whether an application is running
pub struct CheckAppStatus {
    controller: Arc<AppController>,
}

impl CheckAppStatus {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for CheckAppStatus {
    fn name(&self) -> &str {
        "check_app_status"
    }

    fn description(&self) -> &str {
        "Check whether a macOS application is currently running."
    }

    fn parameters_schema(&self) -> Value {
        app_name_schema()
    }

    fn timeout(&self) -> Duration {
        APP_TOOL_TIMEOUT
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let app_name = required_app_name(&params)?;

        let is_running = self
            .controller
            .is_app_running(app_name)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "app_name": app_name,
            "is_running": is_running
        })))
    }
}

/// List all foreground applications
pub struct ListRunningApps {
    controller: Arc<AppController>,
}

impl ListRunningApps {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for ListRunningApps {
    fn name(&self) -> &str {
        "list_running_apps"
    }

    fn description(&self) -> &str {
        "List the names of all foreground applications currently running."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    fn timeout(&self) -> Duration {
        APP_TOOL_TIMEOUT
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        let apps = self
            .controller
            .running_apps()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "count": apps.len(),
            "apps": apps
        })))
    }
}
