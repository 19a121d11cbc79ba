//! Tool registry factory
//!
//! Centralizes tool registration so the CLI and tests wire the same set.
//! Collaborators are injected; nothing here reaches for global state.

use std::sync::Arc;

use crate::config::PackageConfig;
use crate::error::Result;
use crate::system::{AppController, PackageManager};
use crate::tools::{
    CheckAppStatus, GetSystemInfo, InstallSoftware, ListInstalledSoftware, ListRunningApps,
    OpenApp, OpenNotificationSettings, QuitApp, SearchSoftware, ToolRegistry, UninstallSoftware,
};

/// Builder for creating a tool registry with customizable options
pub struct ToolRegistryBuilder {
    manager: Arc<dyn PackageManager>,
    controller: Arc<AppController>,
    package_config: PackageConfig,
    include_packages: bool,
    include_app_control: bool,
    include_system: bool,
}

impl ToolRegistryBuilder {
    pub fn new(manager: Arc<dyn PackageManager>, package_config: PackageConfig) -> Self {
        Self {
            manager,
            controller: Arc::new(AppController::new()),
            package_config,
            include_packages: true,
            include_app_control: true,
            include_system: true,
        }
    }

    /// Use a specific app controller (tests substitute their own)
    pub fn with_app_controller(mut self, controller: Arc<AppController>) -> Self {
        self.controller = controller;
        self
    }

    /// Enable/disable software management tools
    pub fn with_packages(mut self, enabled: bool) -> Self {
        self.include_packages = enabled;
        self
    }

    /// Enable/disable app control tools
    pub fn with_app_control(mut self, enabled: bool) -> Self {
        self.include_app_control = enabled;
        self
    }

    /// Enable/disable system query tools
    pub fn with_system(mut self, enabled: bool) -> Self {
        self.include_system = enabled;
        self
    }

    /// Build the tool registry with the configured options
    pub fn build(self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();

        if self.include_packages {
            registry.register(Arc::new(SearchSoftware::new(
                self.manager.clone(),
                self.package_config.clone(),
            )))?;
            registry.register(Arc::new(InstallSoftware::new(
                self.manager.clone(),
                self.package_config.clone(),
            )))?;
            registry.register(Arc::new(UninstallSoftware::new(
                self.manager.clone(),
                self.package_config.clone(),
            )))?;
            registry.register(Arc::new(ListInstalledSoftware::new(self.manager.clone())))?;
        }

        if self.include_app_control {
            registry.register(Arc::new(OpenApp::new(self.controller.clone())))?;
            registry.register(Arc::new(QuitApp::new(self.controller.clone())))?;
            registry.register(Arc::new(CheckAppStatus::new(self.controller.clone())))?;
            registry.register(Arc::new(ListRunningApps::new(self.controller.clone())))?;
        }

        if self.include_system {
            registry.register(Arc::new(GetSystemInfo::new(self.controller.clone())))?;
            registry.register(Arc::new(OpenNotificationSettings::new(
                self.controller.clone(),
            )))?;
        }

        Ok(registry)
    }
}
