//! Claude Code CLI integration.
//!
//! Runs `claude -p` as a subprocess. Used for planning (no tools) and for
//! task execution, where the CLI is given a working directory and an
//! explicit tool allow-list.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AIError, ExecutionRequest, TaskExecutor, TextGenerator};
use crate::config::AiConfig;

/// Claude CLI provider.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: String,
    model: String,
    max_turns: Option<u32>,
}

impl ClaudeCli {
    /// Create a provider that runs `claude` with the given model alias.
    pub fn new(model: impl Into<String>) -> Self {
        Self { program: "claude".to_string(), model: model.into(), max_turns: None }
    }

    /// Create from the `[ai]` config section.
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            program: config.cli_path.clone(),
            model: config.model.clone(),
            max_turns: config.max_turns,
        }
    }

    /// Use a different executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Cap the number of agentic turns during execution.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    fn base_command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("text")
            .arg("--model")
            .arg(&self.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn generate_command(&self, system: &str, prompt: &str) -> Command {
        let mut cmd = self.base_command(prompt);
        cmd.arg("--system-prompt").arg(system);
        cmd
    }

    fn execute_command(&self, request: &ExecutionRequest) -> Command {
        let mut cmd = self.base_command(&request.prompt);
        cmd.arg("--append-system-prompt")
            .arg(&request.system)
            .arg("--allowedTools")
            .arg(request.allowed_tools.join(","))
            .arg("--permission-mode")
            .arg("bypassPermissions")
            .current_dir(&request.working_dir);
        if let Some(turns) = self.max_turns {
            cmd.arg("--max-turns").arg(turns.to_string());
        }
        cmd
    }

    async fn run(&self, mut cmd: Command) -> anyhow::Result<String> {
        let output = cmd
            .output()
            .await
            .map_err(|e| AIError::ProviderNotAvailable(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(AIError::ProcessFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AIError::NoResponse.into());
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for ClaudeCli {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        tracing::debug!(program = %self.program, model = %self.model, "Generating with Claude CLI");
        self.run(self.generate_command(system, prompt)).await
    }

    fn name(&self) -> &str {
        "claude-cli"
    }
}

#[async_trait]
impl TaskExecutor for ClaudeCli {
    async fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<String> {
        tracing::debug!(
            program = %self.program,
            dir = %request.working_dir.display(),
            tools = %request.allowed_tools.join(","),
            "Executing task with Claude CLI"
        );
        self.run(self.execute_command(request)).await
    }

    fn name(&self) -> &str {
        "claude-cli"
    }
}
