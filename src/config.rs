//! Configuration management for agentic-pm.
//!
//! Handles loading configuration from TOML files and applying environment
//! overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Local config file name, looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".agentic-pm.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ticket store connection
    pub store: StoreConfig,

    /// Team the agents work in
    pub team: TeamConfig,

    /// AI provider settings
    pub ai: AiConfig,

    /// Worker poll loop settings
    pub worker: WorkerConfig,
}

/// Ticket store connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// MCP endpoint URL
    pub url: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { url: "http://localhost:3335/mcp".to_string(), timeout_secs: 30 }
    }
}

/// Team settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Team key (ticket identifier prefix)
    pub key: String,

    /// Team display name
    pub name: String,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self { key: "AGT".to_string(), name: "Agentic PM".to_string() }
    }
}

/// Which backend generates planner output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    /// The `claude` command-line tool
    #[default]
    Cli,
    /// The Anthropic Messages API
    Api,
}

impl std::str::FromStr for AiProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cli" => Ok(Self::Cli),
            "api" => Ok(Self::Api),
            other => Err(format!("unknown AI provider '{other}' (expected cli or api)")),
        }
    }
}

/// AI provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Backend used for planning
    pub provider: AiProviderKind,

    /// Model alias passed to the CLI
    pub model: String,

    /// Model used with the API backend
    pub api_model: String,

    /// Path to the `claude` executable
    pub cli_path: String,

    /// Response token limit for API requests
    pub max_tokens: u32,

    /// Turn cap for task execution
    pub max_turns: Option<u32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::Cli,
            model: "sonnet".to_string(),
            api_model: crate::ai::DEFAULT_API_MODEL.to_string(),
            cli_path: "claude".to_string(),
            max_tokens: 4096,
            max_turns: Some(20),
        }
    }
}

/// Worker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Seconds to sleep when idle or after an error
    pub poll_interval_secs: u64,

    /// Maximum characters of the result summary posted back
    pub summary_limit: usize,

    /// Directory tasks are executed in (`~` is expanded)
    pub working_dir: String,
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The working directory with `~` and environment variables expanded.
    pub fn expanded_working_dir(&self) -> PathBuf {
        expand_path(&self.working_dir)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 5, summary_limit: 2000, working_dir: ".".to_string() }
    }
}

/// Expand `~` and `$VARS` in a path, leaving it unchanged if expansion fails.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(path),
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.agentic-pm.toml` in current directory
    /// 2. `~/.config/agentic-pm/config.toml`
    /// 3. Falls back to defaults
    ///
    /// Environment variables are applied on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::source_path() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// The file `load` reads from, if any exists.
    pub fn source_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::config_dir().map(|dir| dir.join("config.toml")).filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LINEAR_DB_URL") {
            self.store.url = url;
        }
        if let Some(key) = lookup("TEAM_KEY") {
            self.team.key = key;
        }
        if let Some(name) = lookup("TEAM_NAME") {
            self.team.name = name;
        }
        if let Some(interval) = lookup("POLL_INTERVAL") {
            self.worker.poll_interval_secs = interval
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("POLL_INTERVAL must be whole seconds, got '{interval}'"))?;
        }
        if let Some(model) = lookup("CLAUDE_MODEL") {
            self.ai.model = model;
        }
        if let Some(provider) = lookup("AI_PROVIDER") {
            self.ai.provider = provider.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::APP_NAME))
    }
}
