//! Configuration management for Macmate
//!
//! Loads and saves application configuration: provider settings, package
//! manager options, and per-turn limits. The loaded [`Config`] is built once
//! at process start and passed into the components that need it; nothing in
//! the core reads configuration from ambient global state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings
    pub provider: ProviderConfig,
    /// Package manager settings
    pub packages: PackageConfig,
    /// Per-turn limits for the dispatcher
    pub limits: LimitsConfig,
    /// General application settings
    pub general: GeneralConfig,
}

/// LLM Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "anthropic", "openai", "deepseek", etc.
    pub provider_type: String,
    /// API key (can be loaded from env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Model to use
    pub model: String,
    /// Base URL for the API (optional, for OpenAI-compatible endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default max tokens
    pub default_max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::anthropic()
    }
}

impl ProviderConfig {
    /// Create Anthropic provider config
    pub fn anthropic() -> Self {
        Self {
            provider_type: "anthropic".to_string(),
            api_key: None,
            api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            default_max_tokens: 4096,
        }
    }

    /// Create OpenAI provider config
    pub fn openai() -> Self {
        Self {
            provider_type: "openai".to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            model: "gpt-4o".to_string(),
            base_url: None,
            default_max_tokens: 4096,
        }
    }

    /// Get the API key, checking environment variable if not set directly
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        if let Some(env_name) = &self.api_key_env {
            if let Ok(key) = std::env::var(env_name) {
                if !key.is_empty() {
                    return Some(key);
                }
            }
        }

        match self.provider_type.as_str() {
            "anthropic" => std::env::var("ANTHROPIC_API_KEY").ok(),
            "openai" => std::env::var("OPENAI_API_KEY").ok(),
            "deepseek" => std::env::var("DEEPSEEK_API_KEY").ok(),
            "groq" => std::env::var("GROQ_API_KEY").ok(),
            _ => None,
        }
    }
}

/// Package manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Which package manager to use: "brew", "apt", or "auto"
    pub manager: String,
    /// Path to the brew executable (Apple Silicon default; Intel Macs use
    /// /usr/local/bin/brew)
    pub brew_path: PathBuf,
    /// Maximum number of results returned by a search
    pub max_search_results: usize,
    /// Licenses favored when ranking search results
    pub preferred_licenses: Vec<String>,
    /// Timeout for search/info/list commands (seconds)
    pub command_timeout_secs: u64,
    /// Timeout for install/uninstall (seconds); downloads can be slow
    pub install_timeout_secs: u64,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            manager: "auto".to_string(),
            brew_path: PathBuf::from("/opt/homebrew/bin/brew"),
            max_search_results: 5,
            preferred_licenses: vec![
                "MIT".to_string(),
                "Apache-2.0".to_string(),
                "GPL-3.0".to_string(),
                "BSD".to_string(),
            ],
            command_timeout_secs: 30,
            install_timeout_secs: 300,
        }
    }
}

/// Per-turn limits for the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum tool invocations within a single user turn
    pub max_tool_calls: usize,
    /// Maximum messages retained in a session's history
    pub max_history: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: 5,
            max_history: 100,
        }
    }
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level filter ("info", "debug", ...)
    pub log_level: String,
    /// Persist sessions to disk on exit
    pub save_sessions: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            save_sessions: true,
        }
    }
}

/// Configuration manager for loading and saving config
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new config manager with the default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            Config::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Get the default config path (~/.config/macmate/config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("macmate").join("config.toml"))
    }

    /// Load configuration from a file
    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Path this manager reads from and writes to
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&self.config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Set API key for the configured provider
    pub fn set_api_key(&mut self, key: String) {
        self.config.provider.api_key = Some(key);
    }

    /// Get API key for the configured provider
    pub fn get_api_key(&self) -> Option<String> {
        self.config.provider.get_api_key()
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }
}
