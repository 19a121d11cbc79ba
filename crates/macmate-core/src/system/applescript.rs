//! macOS app control via AppleScript
//!
//! Runs scripts through `osascript`. App names are interpolated into script
//! text, so they are sanitized first; AppleScript has no parameter binding.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::run_command;
use crate::error::{Error, Result};

/// Timeout for osascript invocations. App control is interactive; anything
/// slower than this reads as a hang to the user.
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct AppController;

impl AppController {
    pub fn new() -> Self {
        Self
    }

    /// Reject names that would escape the quoted AppleScript string
    fn sanitize_name(name: &str) -> Result<&str> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::AppControl("app name is empty".to_string()));
        }
        if trimmed.contains('"') || trimmed.contains('\\') || trimmed.contains('\n') {
            return Err(Error::AppControl(format!(
                "app name contains invalid characters: {}",
                trimmed
            )));
        }
        Ok(trimmed)
    }

    async fn run_script(&self, script: &str) -> Result<String> {
        debug!(script, "running osascript");
        let output = run_command("osascript", &["-e", script], SCRIPT_TIMEOUT)
            .await
            .map_err(|e| Error::AppControl(e.to_string()))?;
        Ok(output.trim().to_string())
    }

    /// Open (activate) an application
    pub async fn open_app(&self, app_name: &str) -> Result<()> {
        let name = Self::sanitize_name(app_name)?;
        info!(app = name, "opening application");
        self.run_script(&format!(r#"tell application "{}" to activate"#, name))
            .await?;
        Ok(())
    }

    /// Quit an application gracefully
    pub async fn quit_app(&self, app_name: &str) -> Result<()> {
        let name = Self::sanitize_name(app_name)?;
        info!(app = name, "quitting application");
        self.run_script(&format!(r#"quit app "{}""#, name)).await?;
        Ok(())
    }

    /// Whether an application process is currently running
    pub async fn is_app_running(&self, app_name: &str) -> Result<bool> {
        let name = Self::sanitize_name(app_name)?;
        let script = format!(
            r#"tell application "System Events" to return (name of processes) contains "{}""#,
            name
        );
        let output = self.run_script(&script).await?;
        Ok(output.eq_ignore_ascii_case("true"))
    }

    /// Names of all foreground applications
    pub async fn running_apps(&self) -> Result<Vec<String>> {
        let script = r#"tell application "System Events" to return name of every process whose background only is false"#;
        let output = self.run_script(script).await?;

        if output.is_empty() {
            return Ok(Vec::new());
        }

        Ok(output
            .split(", ")
            .map(|app| app.trim().to_string())
            .filter(|app| !app.is_empty())
            .collect())
    }

    /// The macOS product version, e.g. "14.5"
    pub async fn macos_version(&self) -> Result<String> {
        let output = run_command("sw_vers", &["-productVersion"], SCRIPT_TIMEOUT)
            .await
            .map_err(|e| Error::AppControl(e.to_string()))?;
        Ok(output.trim().to_string())
    }

    /// Bundle identifier of a running application, e.g. "com.apple.Safari"
    pub async fn bundle_id(&self, app_name: &str) -> Result<String> {
        let name = Self::sanitize_name(app_name)?;
        let script = format!(
            r#"tell application "System Events" to return bundle identifier of application process "{}""#,
            name
        );
        self.run_script(&script).await
    }

    /// Open the Notifications pane of System Settings.
    ///
    /// macOS does not allow notification permissions to be toggled from a
    /// script; the best available behavior is to land the user on the pane.
    pub async fn open_notification_settings(&self) -> Result<()> {
        warn!("notification permissions require manual action; opening settings pane");
        let script = r#"tell application "System Settings"
    activate
    reveal pane id "com.apple.Notifications-Settings.extension"
end tell"#;
        self.run_script(script).await?;
        Ok(())
    }
}
