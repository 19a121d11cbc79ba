//! Homebrew package manager backend
//!
//! Wraps the `brew` executable. Detail queries use `brew info --json=v2`,
//! which reports formulae and casks in separate arrays; a package is
//! whichever array comes back non-empty.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{run_command, PackageManager};
use crate::config::PackageConfig;
use crate::domain::{License, Package, PackageKind};
use crate::error::{Error, Result};

pub struct BrewRunner {
    config: PackageConfig,
}

impl BrewRunner {
    pub fn new(config: PackageConfig) -> Self {
        Self { config }
    }

    fn brew_path(&self) -> &str {
        self.config.brew_path.to_str().unwrap_or("brew")
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    async fn run(&self, args: &[&str], timeout: Duration) -> Result<String> {
        run_command(self.brew_path(), args, timeout).await
    }

    /// Convert one entry of `brew info --json=v2` output into a [`Package`]
    fn parse_info(&self, value: &Value, kind: PackageKind) -> Package {
        let (name, description, version, homepage, license, downloads) = match kind {
            PackageKind::Formula => (
                value["name"].as_str().unwrap_or_default(),
                value["desc"].as_str().unwrap_or_default(),
                value["versions"]["stable"].as_str(),
                value["homepage"].as_str(),
                value["license"].as_str(),
                value["analytics"]["install"]["30d"]
                    .as_object()
                    .and_then(|m| m.values().next())
                    .and_then(Value::as_u64),
            ),
            PackageKind::Cask => (
                value["token"].as_str().unwrap_or_default(),
                value["desc"].as_str().unwrap_or_default(),
                value["version"].as_str(),
                value["homepage"].as_str(),
                // Casks carry no license field in the JSON output
                None,
                value["analytics"]["install"]["30d"]
                    .as_object()
                    .and_then(|m| m.values().next())
                    .and_then(Value::as_u64),
            ),
        };

        let mut package = Package::new(name, description, kind);
        package.version = version.map(|s| s.to_string());
        package.homepage = homepage.map(|s| s.to_string());
        package.license = license.map(License::parse).unwrap_or(License::Unknown);
        package.download_count = downloads.unwrap_or(0);
        package
    }
}

#[async_trait]
impl PackageManager for BrewRunner {
    fn name(&self) -> &str {
        "brew"
    }

    async fn is_available(&self) -> bool {
        run_command(self.brew_path(), &["--version"], Duration::from_secs(5))
            .await
            .is_ok()
    }

    async fn search(&self, keyword: &str) -> Result<Vec<String>> {
        let output = self.run(&["search", keyword], self.command_timeout()).await?;

        let packages: Vec<String> = output
            .lines()
            .map(str::trim)
            // brew prints "==> Formulae" / "==> Casks" section headers
            .filter(|line| !line.is_empty() && !line.starts_with("==>"))
            .map(|line| line.to_string())
            .collect();

        info!(keyword, count = packages.len(), "brew search complete");
        Ok(packages)
    }

    async fn info(&self, name: &str) -> Result<Package> {
        let output = self
            .run(&["info", "--json=v2", name], self.command_timeout())
            .await?;
        let data: Value = serde_json::from_str(&output)?;

        if let Some(formula) = data["formulae"].as_array().and_then(|a| a.first()) {
            return Ok(self.parse_info(formula, PackageKind::Formula));
        }
        if let Some(cask) = data["casks"].as_array().and_then(|a| a.first()) {
            return Ok(self.parse_info(cask, PackageKind::Cask));
        }

        Err(Error::PackageManager(format!("package not found: {}", name)))
    }

    async fn install(&self, name: &str) -> Result<()> {
        // Resolve the package kind first; casks need the --cask flag
        let package = self.info(name).await?;

        let timeout = Duration::from_secs(self.config.install_timeout_secs);
        let args: Vec<&str> = match package.kind {
            PackageKind::Formula => vec!["install", name],
            PackageKind::Cask => vec!["install", "--cask", name],
        };

        info!(package = name, kind = package.kind.as_str(), "installing");
        self.run(&args, timeout).await?;
        info!(package = name, "install complete");
        Ok(())
    }

    async fn uninstall(&self, name: &str) -> Result<()> {
        let timeout = Duration::from_secs(self.config.install_timeout_secs);
        info!(package = name, "uninstalling");
        self.run(&["uninstall", name], timeout).await?;
        Ok(())
    }

    async fn list_installed(&self) -> Result<Vec<String>> {
        let formulae = self.run(&["list", "--formula"], self.command_timeout()).await?;
        let casks = self.run(&["list", "--cask"], self.command_timeout()).await?;

        let packages: Vec<String> = formulae
            .lines()
            .chain(casks.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();

        debug!(count = packages.len(), "listed installed packages");
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> BrewRunner {
        BrewRunner::new(PackageConfig::default())
    }

    #[test]
    fn test_parse_formula_info() {
        let value: Value = serde_json::from_str(
            r#"{
                "name": "wget",
                "desc": "Internet file retriever",
                "license": "GPL-3.0-or-later",
                "homepage": "https://www.gnu.org/software/wget/",
                "versions": {"stable": "1.24.5"},
                "analytics": {"install": {"30d": {"wget": 123456}}}
            }"#,
        )
        .unwrap();

        let package = runner().parse_info(&value, PackageKind::Formula);
        assert_eq!(package.name, "wget");
        assert_eq!(package.kind, PackageKind::Formula);
        assert_eq!(package.version.as_deref(), Some("1.24.5"));
        assert_eq!(package.license, License::Gpl3);
        assert_eq!(package.download_count, 123456);
    }

    #[test]
    fn test_parse_cask_info() {
        let value: Value = serde_json::from_str(
            r#"{
                "token": "drawio",
                "desc": "Draw.io desktop app",
                "homepage": "https://www.drawio.com/",
                "version": "24.7.8"
            }"#,
        )
        .unwrap();

        let package = runner().parse_info(&value, PackageKind::Cask);
        assert_eq!(package.name, "drawio");
        assert_eq!(package.kind, PackageKind::Cask);
        assert_eq!(package.version.as_deref(), Some("24.7.8"));
        assert_eq!(package.license, License::Unknown);
    }
}
