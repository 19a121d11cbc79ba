//! Software management tools
//!
//! These wrap the [`PackageManager`] backend with model-facing schemas.
//! Search ranks candidates with the domain scoring rules so the model sees
//! recommendable packages first; install/uninstall are the irreversible
//! operations of this system.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::PackageConfig;
use crate::domain::SearchResult;
use crate::error::ToolError;
use crate::system::PackageManager;
use crate::tools::{Tool, ToolOutput};

/// How many search hits are considered for detail lookup and ranking.
/// Each detail lookup is a subprocess call, so the candidate pool is
/// capped independently of `max_results`.
const CANDIDATE_POOL: usize = 8;

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("{} must be a non-empty string", key)))
}

/// Search for software packages by keyword or description
pub struct SearchSoftware {
    manager: Arc<dyn PackageManager>,
    config: PackageConfig,
}

impl SearchSoftware {
    pub fn new(manager: Arc<dyn PackageManager>, config: PackageConfig) -> Self {
        Self { manager, config }
    }
}

#[async_trait]
impl Tool for SearchSoftware {
    fn name(&self) -> &str {
        "search_software"
    }

    fn description(&self) -> &str {
        "Search for software packages by keyword or natural-language description, e.g. 'drawing software' or 'video editor'. Results are ranked with open-source packages first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search keyword, e.g. 'drawio' or 'flowchart tool'"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default 5)"
                }
            },
            "required": ["query"]
        })
    }

    fn timeout(&self) -> Duration {
        // One search plus a detail lookup per candidate
        Duration::from_secs(60)
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let query = required_str(&params, "query")?;
        let max_results = params["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.config.max_search_results);

        let names = self
            .manager
            .search(query)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        let total_count = names.len();

        let mut packages = Vec::new();
        for name in names.iter().take(CANDIDATE_POOL) {
            match self.manager.info(name).await {
                Ok(package) => packages.push(package),
                Err(e) => warn!(package = %name, error = %e, "skipping candidate without info"),
            }
        }

        packages.sort_by(|a, b| {
            b.score(&self.config.preferred_licenses)
                .total_cmp(&a.score(&self.config.preferred_licenses))
        });
        packages.truncate(max_results);

        info!(query, total_count, returned = packages.len(), "search complete");

        let result = SearchResult {
            keyword: query.to_string(),
            total_count,
            packages,
        };
        let value = serde_json::to_value(result)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolOutput::success(value))
    }
}

/// Install a software package
pub struct InstallSoftware {
    manager: Arc<dyn PackageManager>,
    config: PackageConfig,
}

impl InstallSoftware {
    pub fn new(manager: Arc<dyn PackageManager>, config: PackageConfig) -> Self {
        Self { manager, config }
    }
}

#[async_trait]
impl Tool for InstallSoftware {
    fn name(&self) -> &str {
        "install_software"
    }

    fn description(&self) -> &str {
        "Install a software package. This is a sensitive operation; confirm with the user before invoking it."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "package_name": {
                    "type": "string",
                    "description": "Exact package name to install, e.g. 'drawio' or 'visual-studio-code'"
                }
            },
            "required": ["package_name"]
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.install_timeout_secs)
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let name = required_str(&params, "package_name")?;

        self.manager
            .install(name)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "package_name": name,
            "message": format!("Installed {}", name)
        })))
    }
}

/// Uninstall a software package
pub struct UninstallSoftware {
    manager: Arc<dyn PackageManager>,
    config: PackageConfig,
}

impl UninstallSoftware {
    pub fn new(manager: Arc<dyn PackageManager>, config: PackageConfig) -> Self {
        Self { manager, config }
    }
}

#[async_trait]
impl Tool for UninstallSoftware {
    fn name(&self) -> &str {
        "uninstall_software"
    }

    fn description(&self) -> &str {
        "Uninstall a software package. This is a sensitive operation; confirm with the user before invoking it."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "package_name": {
                    "type": "string",
                    "description": "Exact package name to uninstall"
                }
            },
            "required": ["package_name"]
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.install_timeout_secs)
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let name = required_str(&params, "package_name")?;

        self.manager
            .uninstall(name)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "package_name": name,
            "message": format!("Uninstalled {}", name)
        })))
    }
}

/// List installed software packages
pub struct ListInstalledSoftware {
    manager: Arc<dyn PackageManager>,
}

impl ListInstalledSoftware {
    pub fn new(manager: Arc<dyn PackageManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Tool for ListInstalledSoftware {
    fn name(&self) -> &str {
        "list_installed_software"
    }

    fn description(&self) -> &str {
        "List all software packages currently installed on this system."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        let packages = self
            .manager
            .list_installed()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput::success(json!({
            "count": packages.len(),
            "packages": packages
        })))
    }
}
