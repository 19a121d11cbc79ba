//! OS automation collaborators
//!
//! Everything that shells out lives here: the package manager backends
//! (Homebrew, apt) and the AppleScript app controller. These are the
//! side-effecting edges of the system; the tool layer wraps them with
//! schemas and the executor wraps the tools with timeouts.

mod applescript;
mod apt;
mod brew;
mod command;

pub use applescript::AppController;
pub use apt::AptRunner;
pub use brew::BrewRunner;
pub use command::run_command;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PackageConfig;
use crate::domain::Package;
use crate::error::{Error, Result};

/// Abstraction over a system package manager
///
/// Implementations are synchronous-looking async calls that block on an
/// external process. Install and uninstall have real, irreversible side
/// effects; callers report outcomes but never roll back.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Backend name ("brew", "apt")
    fn name(&self) -> &str;

    /// Whether the backend's executable is present on this host
    async fn is_available(&self) -> bool;

    /// Search for packages by keyword, returning candidate names
    async fn search(&self, keyword: &str) -> Result<Vec<String>>;

    /// Fetch detail for a single package
    async fn info(&self, name: &str) -> Result<Package>;

    /// Install a package
    async fn install(&self, name: &str) -> Result<()>;

    /// Uninstall a package
    async fn uninstall(&self, name: &str) -> Result<()>;

    /// List installed package names
    async fn list_installed(&self) -> Result<Vec<String>>;
}

/// Select a package manager backend from configuration.
///
/// "auto" picks brew on macOS and apt elsewhere; an explicit setting is
/// honored as-is so tests and unusual hosts can force a backend.
pub fn create_package_manager(config: &PackageConfig) -> Result<Arc<dyn PackageManager>> {
    match config.manager.as_str() {
        "brew" => Ok(Arc::new(BrewRunner::new(config.clone()))),
        "apt" => Ok(Arc::new(AptRunner::new(config.clone()))),
        "auto" => {
            if cfg!(target_os = "macos") {
                Ok(Arc::new(BrewRunner::new(config.clone())))
            } else {
                Ok(Arc::new(AptRunner::new(config.clone())))
            }
        }
        other => Err(Error::Config(format!(
            "Unknown package manager backend: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_backend_selection() {
        let mut config = PackageConfig::default();

        config.manager = "brew".to_string();
        assert_eq!(create_package_manager(&config).unwrap().name(), "brew");

        config.manager = "apt".to_string();
        assert_eq!(create_package_manager(&config).unwrap().name(), "apt");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut config = PackageConfig::default();
        config.manager = "pacman".to_string();
        assert!(create_package_manager(&config).is_err());
    }
}
