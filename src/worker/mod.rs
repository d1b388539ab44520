//! Worker agent.
//!
//! A worker polls the store for unstarted tickets assigned to its identity
//! and works them one at a time:
//!
//! ```text
//!   Idle ──claim──▶ Claimed ──"In Progress"──▶ Executing ──▶ Reporting ──"Done"──▶ Idle
//! ```
//!
//! There is no claim lock. Two workers sharing an identity can both pick
//! up the same ticket, and a failure between the two state changes leaves
//! the ticket in progress. Neither case is repaired here.

mod capabilities;
mod prompt;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub use capabilities::{allowed_tools, BASE_TOOLS, WRITE_LABELS, WRITE_TOOLS};
pub use prompt::{
    completion_comment, error_summary, start_comment, task_prompt, truncate_summary,
    WORKER_SYSTEM_PROMPT,
};

use crate::ai::{ExecutionRequest, TaskExecutor};
use crate::config::Config;
use crate::store::{Lifecycle, StoreResult, Ticket, TicketQuery, TicketStore, TicketUpdate};

/// Where a worker is in its cycle. Non-idle states carry the ticket ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Claimed(String),
    Executing(String),
    Reporting(String),
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing was pending.
    NoWork,
    /// A ticket was worked and marked done.
    Completed {
        /// The ticket as read at claim time
        ticket: Ticket,
        /// The summary posted back (already truncated)
        summary: String,
    },
}

/// Worker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Team whose tickets are polled
    pub team: String,
    /// Directory tasks are executed in
    pub working_dir: PathBuf,
    /// Sleep between idle polls and after failures
    pub poll_interval: Duration,
    /// Maximum characters of the posted summary
    pub summary_limit: usize,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            team: config.team.key.clone(),
            working_dir: config.worker.expanded_working_dir(),
            poll_interval: config.worker.poll_interval(),
            summary_limit: config.worker.summary_limit,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Worker agent for one identity.
pub struct Worker<S> {
    identity: String,
    store: S,
    executor: Box<dyn TaskExecutor>,
    settings: WorkerSettings,
    state: WorkerState,
}

impl<S: TicketStore> Worker<S> {
    /// Create a worker for `identity` (the assignee email).
    pub fn new(
        identity: impl Into<String>,
        store: S,
        executor: Box<dyn TaskExecutor>,
        settings: WorkerSettings,
    ) -> Self {
        Self { identity: identity.into(), store, executor, settings, state: WorkerState::Idle }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Current state. After a failed cycle this is where the cycle stopped.
    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Unstarted tickets assigned to this worker, in store order.
    pub async fn pending_tickets(&mut self) -> StoreResult<Vec<Ticket>> {
        let query = TicketQuery::assigned(&self.settings.team, &self.identity);
        let tickets = self.store.list_tickets(&query).await?;
        Ok(tickets.into_iter().filter(Ticket::is_unstarted).collect())
    }

    /// Pick the first pending ticket, if any.
    pub async fn claim(&mut self) -> StoreResult<Option<Ticket>> {
        self.state = WorkerState::Idle;

        let ticket = self.pending_tickets().await?.into_iter().next();
        match ticket {
            Some(ref t) => {
                tracing::info!(worker = %self.identity, ticket = %t.display_id(), "Picked up: {}", t.title);
                self.state = WorkerState::Claimed(t.id.clone());
            }
            None => tracing::debug!(worker = %self.identity, "No pending tickets"),
        }
        Ok(ticket)
    }

    /// Run one full cycle: claim, start, execute, report.
    ///
    /// Execution failures are reported on the ticket and do not fail the
    /// cycle. Store failures do, leaving [`state`](Self::state) where the
    /// cycle stopped.
    pub async fn run_cycle(&mut self) -> anyhow::Result<CycleOutcome> {
        let Some(listed) = self.claim().await? else {
            return Ok(CycleOutcome::NoWork);
        };
        let id = listed.id.clone();

        self.store
            .update_ticket(&id, &TicketUpdate::transition(&Lifecycle::InProgress))
            .await
            .with_context(|| format!("Failed to start {}", listed.display_id()))?;
        self.store
            .create_comment(&id, &start_comment(&self.identity))
            .await
            .with_context(|| format!("Failed to comment on {}", listed.display_id()))?;

        let ticket = self.refresh(listed).await;

        self.state = WorkerState::Executing(id.clone());
        let summary = self.execute(&ticket).await;

        self.state = WorkerState::Reporting(id.clone());
        let summary = truncate_summary(&summary, self.settings.summary_limit).to_string();

        self.store
            .update_ticket(&id, &TicketUpdate::transition(&Lifecycle::Done))
            .await
            .with_context(|| format!("Failed to complete {}", ticket.display_id()))?;
        self.store
            .create_comment(&id, &completion_comment(&self.identity, &summary))
            .await
            .with_context(|| format!("Failed to report on {}", ticket.display_id()))?;

        tracing::info!(worker = %self.identity, ticket = %ticket.display_id(), "Completed ticket");
        self.state = WorkerState::Idle;

        Ok(CycleOutcome::Completed { ticket, summary })
    }

    /// Single-shot mode: run at most one cycle.
    ///
    /// Returns whether a ticket was processed.
    pub async fn run_once(&mut self) -> anyhow::Result<bool> {
        tracing::info!(worker = %self.identity, "Checking for tickets");
        let outcome = self.run_cycle().await?;
        Ok(matches!(outcome, CycleOutcome::Completed { .. }))
    }

    /// Continuous mode: poll forever.
    ///
    /// Sleeps one poll interval when idle and after a failed cycle.
    pub async fn run_forever(&mut self) {
        tracing::info!(
            worker = %self.identity,
            interval_secs = self.settings.poll_interval.as_secs(),
            "Worker polling"
        );

        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Completed { .. }) => {}
                Ok(CycleOutcome::NoWork) => tokio::time::sleep(self.settings.poll_interval).await,
                Err(e) => {
                    tracing::error!(worker = %self.identity, state = ?self.state, "Worker cycle failed: {e:#}");
                    self.state = WorkerState::Idle;
                    tokio::time::sleep(self.settings.poll_interval).await;
                }
            }
        }
    }

    /// Re-read a ticket for its labels; the list view carries none.
    async fn refresh(&mut self, listed: Ticket) -> Ticket {
        match self.store.get_ticket(&listed.id).await {
            Ok(full) => full,
            Err(e) => {
                tracing::warn!(ticket = %listed.display_id(), error = %e, "Using listed ticket");
                listed
            }
        }
    }

    async fn execute(&self, ticket: &Ticket) -> String {
        let title = if ticket.title.is_empty() { "Unknown task" } else { ticket.title.as_str() };
        let request = ExecutionRequest {
            system: WORKER_SYSTEM_PROMPT.to_string(),
            prompt: task_prompt(title, ticket.description.as_deref().unwrap_or_default()),
            working_dir: self.settings.working_dir.clone(),
            allowed_tools: allowed_tools(&ticket.labels),
        };

        match self.executor.execute(&request).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(ticket = %ticket.display_id(), executor = self.executor.name(), "Task execution failed: {e:#}");
                error_summary(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.team.key = "ENG".to_string();
        config.worker.poll_interval_secs = 9;

        let settings = WorkerSettings::from_config(&config);
        assert_eq!(settings.team, "ENG");
        assert_eq!(settings.poll_interval, Duration::from_secs(9));
        assert_eq!(settings.summary_limit, 2000);
        assert_eq!(settings.working_dir, PathBuf::from("."));
    }
}
