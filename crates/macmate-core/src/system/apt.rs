//! APT package manager backend for Debian/Ubuntu hosts

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{run_command, PackageManager};
use crate::config::PackageConfig;
use crate::domain::{License, Package, PackageKind};
use crate::error::{Error, Result};

pub struct AptRunner {
    config: PackageConfig,
}

impl AptRunner {
    pub fn new(config: PackageConfig) -> Self {
        Self { config }
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }
}

#[async_trait]
impl PackageManager for AptRunner {
    fn name(&self) -> &str {
        "apt"
    }

    async fn is_available(&self) -> bool {
        run_command("apt-get", &["--version"], Duration::from_secs(5))
            .await
            .is_ok()
    }

    async fn search(&self, keyword: &str) -> Result<Vec<String>> {
        let output = run_command("apt-cache", &["search", keyword], self.command_timeout()).await?;

        // apt-cache prints "name - description" per line
        let packages: Vec<String> = output
            .lines()
            .filter_map(|line| line.split_once(" - ").map(|(name, _)| name.trim()))
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect();

        info!(keyword, count = packages.len(), "apt search complete");
        Ok(packages)
    }

    async fn info(&self, name: &str) -> Result<Package> {
        let output = run_command("apt-cache", &["show", name], self.command_timeout())
            .await
            .map_err(|_| Error::PackageManager(format!("package not found: {}", name)))?;

        let mut description = String::new();
        let mut version = None;
        let mut homepage = None;

        for line in output.lines() {
            if let Some((key, value)) = line.split_once(':') {
                match key.trim() {
                    "Description" | "Description-en" => description = value.trim().to_string(),
                    "Version" => version = Some(value.trim().to_string()),
                    "Homepage" => homepage = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }

        if description.is_empty() && version.is_none() {
            return Err(Error::PackageManager(format!("package not found: {}", name)));
        }

        let mut package = Package::new(name, description, PackageKind::Formula);
        package.version = version;
        package.homepage = homepage;
        // apt metadata does not carry a license field
        package.license = License::Unknown;
        Ok(package)
    }

    async fn install(&self, name: &str) -> Result<()> {
        let timeout = Duration::from_secs(self.config.install_timeout_secs);
        info!(package = name, "installing via apt-get");
        run_command("sudo", &["apt-get", "install", "-y", name], timeout).await?;
        info!(package = name, "install complete");
        Ok(())
    }

    async fn uninstall(&self, name: &str) -> Result<()> {
        let timeout = Duration::from_secs(self.config.install_timeout_secs);
        info!(package = name, "removing via apt-get");
        run_command("sudo", &["apt-get", "remove", "-y", name], timeout).await?;
        Ok(())
    }

    async fn list_installed(&self) -> Result<Vec<String>> {
        let output = run_command("dpkg-query", &["-f", "${binary:Package}\n", "-W"], self.command_timeout()).await?;

        let packages: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();

        debug!(count = packages.len(), "listed installed packages");
        Ok(packages)
    }
}
