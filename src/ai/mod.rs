//! AI capabilities used by the agents.
//!
//! The planner needs a [`TextGenerator`] (prompt in, text out, no tools).
//! The worker needs a [`TaskExecutor`] (prompt in, summary out, with tool
//! permissions and a working directory). Both are trait objects so the
//! agents can be driven by the Claude CLI, the Claude API or a test fake.

mod claude;
mod cli;

use std::path::PathBuf;

pub use claude::{ClaudeProvider, DEFAULT_API_MODEL};
pub use cli::ClaudeCli;

use async_trait::async_trait;

use crate::config::{AiConfig, AiProviderKind};

/// Text generation without tool use.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a response to `prompt` under the given system prompt.
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// A unit of work handed to a [`TaskExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// System prompt
    pub system: String,
    /// Task prompt
    pub prompt: String,
    /// Directory the executor works in
    pub working_dir: PathBuf,
    /// Tool names the executor may use without asking
    pub allowed_tools: Vec<String>,
}

/// Agentic task execution with tool permissions.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Carry out the task and return a textual summary.
    async fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("{program} exited with {status}: {stderr}")]
    ProcessFailed { program: String, status: String, stderr: String },

    #[error("No response from AI")]
    NoResponse,
}

/// Build the text generator selected by the configuration.
pub fn generator_from_config(config: &AiConfig) -> anyhow::Result<Box<dyn TextGenerator>> {
    match config.provider {
        AiProviderKind::Cli => Ok(Box::new(ClaudeCli::from_config(config))),
        AiProviderKind::Api => Ok(Box::new(
            ClaudeProvider::new()?.with_model(&config.api_model).with_max_tokens(config.max_tokens),
        )),
    }
}

/// Build the task executor selected by the configuration.
///
/// Execution needs local tool access, so it always goes through the CLI.
pub fn executor_from_config(config: &AiConfig) -> Box<dyn TaskExecutor> {
    Box::new(ClaudeCli::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_generator_from_default_config() {
        let generator = generator_from_config(&AiConfig::default()).unwrap();
        assert_eq!(generator.name(), "claude-cli");
    }

    #[test]
    fn test_executor_is_cli() {
        let executor = executor_from_config(&AiConfig::default());
        assert_eq!(executor.name(), "claude-cli");
    }

    #[test]
    #[serial_test::serial]
    fn test_api_generator_needs_key() {
        let saved = std::env::var("ANTHROPIC_API_KEY").ok();
        let config = AiConfig { provider: AiProviderKind::Api, ..AiConfig::default() };

        std::env::remove_var("ANTHROPIC_API_KEY");
        assert!(generator_from_config(&config).is_err());

        std::env::set_var("ANTHROPIC_API_KEY", "test-key");
        assert_eq!(generator_from_config(&config).unwrap().name(), "claude-api");

        match saved {
            Some(key) => std::env::set_var("ANTHROPIC_API_KEY", key),
            None => std::env::remove_var("ANTHROPIC_API_KEY"),
        }
    }
}
