//! Shared fixtures for integration tests.
//!
//! `MemoryStore` is an in-memory `TicketStore` that behaves like the real
//! store where it matters: duplicate creates are rejected with an
//! "already exists" message, list views carry no labels, and updates are
//! applied without looking at the current state.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentic_pm::ai::{ExecutionRequest, TaskExecutor, TextGenerator};
use agentic_pm::store::{
    Comment, CreateOutcome, Label, LabelSpec, NewTicket, StoreError, StoreResult, Team, Ticket,
    TicketQuery, TicketStore, TicketUpdate, User,
};

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub team: String,
    pub ticket: Ticket,
}

#[derive(Debug, Default)]
pub struct StoreState {
    pub teams: Vec<Team>,
    pub labels: Vec<(String, Label)>,
    pub users: Vec<User>,
    pub tickets: Vec<StoredTicket>,
    pub comments: Vec<(String, Comment)>,
    /// Every update applied, in order
    pub updates: Vec<(String, TicketUpdate)>,
    /// Every operation called, in order
    pub calls: Vec<String>,
    /// Scripted results per operation; `None` lets the call through
    pub failures: HashMap<String, VecDeque<Option<StoreError>>>,
    /// Behave like a store without a `create_user` tool
    pub no_user_tool: bool,
    next_id: usize,
}

/// Cloneable handle to a shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    interleave: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield to the scheduler at the start of every call, so concurrent
    /// agents sharing this store interleave at each store round trip.
    pub fn interleaved(&self) -> Self {
        Self { state: Arc::clone(&self.state), interleave: true }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: &str, error: StoreError) {
        self.state().failures.entry(op.to_string()).or_default().push_back(Some(error));
    }

    /// Let the next call of `op` through before any scripted failure.
    pub fn pass_next(&self, op: &str) {
        self.state().failures.entry(op.to_string()).or_default().push_back(None);
    }

    pub fn without_user_tool(self) -> Self {
        self.state().no_user_tool = true;
        self
    }

    /// Insert a ticket directly, as if another planner had created it.
    pub fn seed_ticket(&self, team: &str, title: &str, assignee: Option<&str>, labels: &[&str]) -> String {
        let mut state = self.state();
        state.next_id += 1;
        let n = state.next_id;
        let ticket = Ticket {
            id: format!("ticket-{n}"),
            identifier: Some(format!("{team}-{n}")),
            title: title.to_string(),
            description: Some(format!("Description of {title}")),
            status_type: Some("unstarted".to_string()),
            status_name: Some("Todo".to_string()),
            assignee: assignee.map(str::to_string),
            assignee_name: None,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            priority: Some(3),
            comments: Vec::new(),
        };
        let id = ticket.id.clone();
        state.tickets.push(StoredTicket { team: team.to_string(), ticket });
        id
    }

    pub fn set_status(&self, id: &str, status_type: &str, status_name: &str) {
        let mut state = self.state();
        let stored = state.tickets.iter_mut().find(|t| t.ticket.id == id).unwrap();
        stored.ticket.status_type = Some(status_type.to_string());
        stored.ticket.status_name = Some(status_name.to_string());
    }

    pub fn ticket(&self, id: &str) -> Ticket {
        self.state().tickets.iter().find(|t| t.ticket.id == id).unwrap().ticket.clone()
    }

    pub fn status_of(&self, id: &str) -> Option<String> {
        self.ticket(id).status_name
    }

    pub fn comments_on(&self, id: &str) -> Vec<String> {
        self.state()
            .comments
            .iter()
            .filter(|(ticket, _)| ticket == id)
            .map(|(_, c)| c.body.clone())
            .collect()
    }

    /// State names applied to a ticket, in order.
    pub fn transitions_of(&self, id: &str) -> Vec<String> {
        self.state()
            .updates
            .iter()
            .filter(|(ticket, _)| ticket == id)
            .filter_map(|(_, u)| u.state.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    async fn enter(&self, op: &str) -> Result<(), StoreError> {
        if self.interleave {
            tokio::task::yield_now().await;
        }
        let mut state = self.state();
        state.calls.push(op.to_string());
        match state.failures.get_mut(op).and_then(VecDeque::pop_front) {
            Some(Some(error)) => Err(error),
            _ => Ok(()),
        }
    }
}

pub fn rejected(tool: &str, message: &str) -> StoreError {
    StoreError::Rejected { tool: tool.to_string(), message: message.to_string() }
}

pub fn transport_fault() -> StoreError {
    StoreError::Transport(agentic_pm::McpError::MalformedResponse {
        status: 502,
        body: "Bad Gateway".to_string(),
    })
}

fn status_type_for(state: &str) -> &'static str {
    match state {
        "In Progress" => "started",
        "Done" => "completed",
        "Canceled" => "canceled",
        "Backlog" => "backlog",
        _ => "unstarted",
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn create_team(&mut self, name: &str, key: &str) -> CreateOutcome<Team> {
        if let Err(e) = self.enter("create_team").await {
            return CreateOutcome::from_result(Err(e));
        }
        let mut state = self.state();
        if state.teams.iter().any(|t| t.key == key) {
            return CreateOutcome::from_result(Err(rejected(
                "create_team",
                &format!("Team with key '{key}' already exists"),
            )));
        }
        let team = Team { id: Some(format!("team-{key}")), name: name.to_string(), key: key.to_string() };
        state.teams.push(team.clone());
        CreateOutcome::Created(team)
    }

    async fn list_teams(&mut self) -> StoreResult<Vec<Team>> {
        self.enter("list_teams").await?;
        Ok(self.state().teams.clone())
    }

    async fn create_label(&mut self, team: &str, label: &LabelSpec) -> CreateOutcome<Label> {
        if let Err(e) = self.enter("create_label").await {
            return CreateOutcome::from_result(Err(e));
        }
        let mut state = self.state();
        if state.labels.iter().any(|(t, l)| t == team && l.name == label.name) {
            return CreateOutcome::from_result(Err(rejected("create_issue_label", "Label already exists")));
        }
        let created = Label {
            id: Some(format!("label-{}", label.name)),
            name: label.name.to_string(),
            color: Some(label.color.to_string()),
        };
        state.labels.push((team.to_string(), created.clone()));
        CreateOutcome::Created(created)
    }

    async fn create_user(&mut self, name: &str, email: &str) -> CreateOutcome<User> {
        if let Err(e) = self.enter("create_user").await {
            return CreateOutcome::from_result(Err(e));
        }
        let mut state = self.state();
        if state.no_user_tool {
            return CreateOutcome::from_result(Err(rejected("create_user", "Unknown tool: create_user")));
        }
        if state.users.iter().any(|u| u.email == email) {
            return CreateOutcome::from_result(Err(rejected("create_user", "User already exists")));
        }
        let user = User { id: Some(format!("user-{email}")), name: name.to_string(), email: email.to_string() };
        state.users.push(user.clone());
        CreateOutcome::Created(user)
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        self.enter("list_users").await?;
        Ok(self.state().users.clone())
    }

    async fn create_ticket(&mut self, new: &NewTicket) -> StoreResult<Ticket> {
        self.enter("create_ticket").await?;
        let mut state = self.state();
        state.next_id += 1;
        let n = state.next_id;
        let ticket = Ticket {
            id: format!("ticket-{n}"),
            identifier: Some(format!("{}-{n}", new.team)),
            title: new.title.clone(),
            description: Some(new.description.clone()),
            status_type: Some("unstarted".to_string()),
            status_name: Some("Todo".to_string()),
            assignee: new.assignee.clone(),
            assignee_name: None,
            labels: new.labels.clone(),
            priority: Some(new.priority),
            comments: Vec::new(),
        };
        state.tickets.push(StoredTicket { team: new.team.clone(), ticket: ticket.clone() });
        Ok(ticket)
    }

    async fn list_tickets(&mut self, query: &TicketQuery) -> StoreResult<Vec<Ticket>> {
        self.enter("list_tickets").await?;
        let state = self.state();
        Ok(state
            .tickets
            .iter()
            .filter(|t| query.team.as_ref().map_or(true, |team| &t.team == team))
            .filter(|t| query.assignee.is_none() || t.ticket.assignee == query.assignee)
            .filter(|t| query.state.is_none() || t.ticket.status_name == query.state)
            .map(|t| Ticket { labels: Vec::new(), comments: Vec::new(), ..t.ticket.clone() })
            .collect())
    }

    async fn get_ticket(&mut self, id: &str) -> StoreResult<Ticket> {
        self.enter("get_ticket").await?;
        let state = self.state();
        let stored = state
            .tickets
            .iter()
            .find(|t| t.ticket.id == id || t.ticket.identifier.as_deref() == Some(id))
            .ok_or_else(|| rejected("get_issue", "Issue not found"))?;
        let comments = state
            .comments
            .iter()
            .filter(|(ticket, _)| *ticket == stored.ticket.id)
            .map(|(_, c)| c.clone())
            .collect();
        Ok(Ticket { comments, ..stored.ticket.clone() })
    }

    async fn update_ticket(&mut self, id: &str, update: &TicketUpdate) -> StoreResult<()> {
        self.enter("update_ticket").await?;
        let mut state = self.state();
        state.updates.push((id.to_string(), update.clone()));
        let stored = state
            .tickets
            .iter_mut()
            .find(|t| t.ticket.id == id)
            .ok_or_else(|| rejected("update_issue", "Issue not found"))?;
        if let Some(ref name) = update.state {
            stored.ticket.status_name = Some(name.clone());
            stored.ticket.status_type = Some(status_type_for(name).to_string());
        }
        if let Some(ref assignee) = update.assignee {
            stored.ticket.assignee = Some(assignee.clone());
        }
        Ok(())
    }

    async fn create_comment(&mut self, ticket_id: &str, body: &str) -> StoreResult<Comment> {
        self.enter("create_comment").await?;
        let mut state = self.state();
        if !state.tickets.iter().any(|t| t.ticket.id == ticket_id) {
            return Err(rejected("create_comment", "Issue not found"));
        }
        let comment = Comment {
            id: Some(format!("comment-{}", state.comments.len() + 1)),
            body: body.to_string(),
            author: None,
            created_at: None,
        };
        state.comments.push((ticket_id.to_string(), comment.clone()));
        Ok(comment)
    }
}

// ============================================================================
// AI fakes
// ============================================================================

/// Generator that returns a fixed reply and records its prompts.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    pub prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self { reply: Ok(reply.to_string()), prompts: Arc::default() }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: Err(message.to_string()), prompts: Arc::default() }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push((system.to_string(), prompt.to_string()));
        self.reply.clone().map_err(anyhow::Error::msg)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Executor that returns queued results (default "done") and records requests.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    results: Arc<Mutex<VecDeque<Result<String, String>>>>,
    pub requests: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, summary: &str) -> Self {
        self.results.lock().unwrap().push_back(Ok(summary.to_string()));
        self
    }

    pub fn then_err(self, message: &str) -> Self {
        self.results.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(Ok(summary)) => Ok(summary),
            Some(Err(message)) => Err(anyhow::Error::msg(message)),
            None => Ok("done".to_string()),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}
