//! Planner agent.
//!
//! Turns a requirement document into tickets:
//!
//! 1. make sure the team exists (and seed its labels when it is new)
//! 2. make sure every worker has a user record
//! 3. ask the generator for a task list and repair its output
//! 4. assign tasks to workers round robin
//! 5. create one ticket per task
//!
//! Setup is idempotent, so running the planner twice against the same
//! store only adds the second batch of tickets.

mod assign;
mod prompt;
mod repair;
mod task;

use anyhow::Context;

pub use assign::{assignee_for, round_robin};
pub use prompt::{requirement_prompt, PLANNER_SYSTEM_PROMPT};
pub use repair::{
    array_span, close_truncated_array, parse_task_list, restore_object_boundary, RepairPass,
    REPAIR_PASSES,
};
pub use task::Task;

use crate::ai::TextGenerator;
use crate::config::TeamConfig;
use crate::store::{
    CreateOutcome, StoreError, Ticket, TicketStore, User, STANDARD_LABELS,
};

/// Planner agent bound to one store and one generator.
pub struct Planner<S> {
    store: S,
    generator: Box<dyn TextGenerator>,
    team: TeamConfig,
}

impl<S: TicketStore> Planner<S> {
    /// Create a new planner.
    pub fn new(store: S, generator: Box<dyn TextGenerator>, team: TeamConfig) -> Self {
        Self { store, generator, team }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Break a requirement document into tickets assigned to `workers`.
    ///
    /// Returns the created tickets in task order. Tickets the store refused
    /// to create are logged and left out.
    pub async fn process_requirement(
        &mut self,
        document: &str,
        workers: &[String],
    ) -> anyhow::Result<Vec<Ticket>> {
        tracing::info!(team = %self.team.key, workers = workers.len(), "Processing requirement");

        self.ensure_team().await?;
        self.ensure_workers(workers).await?;

        let tasks = self.generate_tasks(document).await?;
        if tasks.is_empty() {
            tracing::warn!("No tasks generated from requirement");
            return Ok(Vec::new());
        }
        tracing::info!(count = tasks.len(), "Generated tasks");

        Ok(self.create_tickets(&tasks, workers).await)
    }

    /// Create the team, seeding the standard labels if it is new.
    pub async fn ensure_team(&mut self) -> anyhow::Result<()> {
        match self.store.create_team(&self.team.name, &self.team.key).await {
            CreateOutcome::Created(_) => {
                tracing::info!(team = %self.team.key, "Created team");
                self.ensure_labels().await?;
            }
            CreateOutcome::AlreadyExisted => {
                tracing::debug!(team = %self.team.key, "Team already exists");
            }
            CreateOutcome::Failed(e) => {
                return Err(e).with_context(|| format!("Failed to create team {}", self.team.key));
            }
        }
        Ok(())
    }

    async fn ensure_labels(&mut self) -> Result<(), StoreError> {
        for label in &STANDARD_LABELS {
            let outcome = self.store.create_label(&self.team.key, label).await;
            tolerate(outcome, "label", label.name)?;
        }
        Ok(())
    }

    /// Create a user record for every worker.
    pub async fn ensure_workers(&mut self, workers: &[String]) -> anyhow::Result<()> {
        for email in workers {
            let user = User::from_email(email);
            let outcome = self.store.create_user(&user.name, &user.email).await;
            tolerate(outcome, "user", email)
                .with_context(|| format!("Failed to create worker {email}"))?;
        }
        Ok(())
    }

    /// Ask the generator for tasks and parse its reply.
    pub async fn generate_tasks(&self, document: &str) -> anyhow::Result<Vec<Task>> {
        tracing::debug!(generator = self.generator.name(), "Requesting task breakdown");
        let reply = self
            .generator
            .generate(PLANNER_SYSTEM_PROMPT, &requirement_prompt(document))
            .await
            .with_context(|| format!("Task generation with {} failed", self.generator.name()))?;

        Ok(parse_task_list(&reply))
    }

    /// Create one ticket per task, assigned round robin.
    pub async fn create_tickets(&mut self, tasks: &[Task], workers: &[String]) -> Vec<Ticket> {
        let mut created = Vec::with_capacity(tasks.len());

        for (task, assignee) in tasks.iter().zip(round_robin(tasks.len(), workers)) {
            let new_ticket = task.to_new_ticket(&self.team.key, assignee);
            match self.store.create_ticket(&new_ticket).await {
                Ok(ticket) => {
                    tracing::info!(
                        ticket = %ticket.display_id(),
                        assignee = assignee.unwrap_or("unassigned"),
                        "Created ticket: {}",
                        task.title
                    );
                    created.push(ticket);
                }
                Err(e) => {
                    tracing::error!(title = %task.title, error = %e, "Failed to create ticket");
                }
            }
        }

        created
    }
}

/// Apply the setup policy to a label or user create.
///
/// Duplicates and store rejections are logged; transport faults propagate.
fn tolerate<T>(outcome: CreateOutcome<T>, kind: &str, name: &str) -> Result<(), StoreError> {
    match outcome {
        CreateOutcome::Created(_) => tracing::debug!(kind, name, "Created"),
        CreateOutcome::AlreadyExisted => tracing::debug!(kind, name, "Already exists"),
        CreateOutcome::Failed(e) if e.is_transport() => return Err(e),
        CreateOutcome::Failed(e) => tracing::warn!(kind, name, error = %e, "Store refused create"),
    }
    Ok(())
}
