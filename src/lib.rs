#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]

//! # agentic-pm
//!
//! A planner agent and a pool of worker agents coordinating through a
//! ticket store that speaks MCP over HTTP.
//!
//! The planner turns a requirement document into a handful of tickets and
//! assigns them round robin. Each worker polls for its unstarted tickets,
//! executes them with an AI agent, and reports the result back on the
//! ticket.
//!
//! ## Modules
//!
//! - [`mcp`]: session-stateful JSON-RPC client for the store endpoint
//! - [`store`]: typed ticket-store operations on top of MCP tool calls
//! - [`planner`]: requirement breakdown, output repair, assignment
//! - [`worker`]: the poll/claim/execute/report loop
//! - [`ai`]: text generation and task execution backends
//! - [`config`]: layered configuration
//!
//! ## Quick Start
//!
//! ```bash
//! # Plan a requirement for two workers
//! agentic-pm plan "Build a landing page" --workers alice@local,bob@local
//!
//! # Let a worker pick up one ticket
//! agentic-pm work alice@local
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::future_not_send)]

pub mod ai;
pub mod config;
pub mod mcp;
pub mod planner;
pub mod store;
pub mod worker;

pub use config::Config;
pub use mcp::{McpError, McpHttpClient};
pub use planner::{parse_task_list, Planner, Task};
pub use store::{CreateOutcome, McpTicketStore, StoreError, Ticket, TicketStore};
pub use worker::{CycleOutcome, Worker, WorkerSettings, WorkerState};

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const APP_NAME: &str = "agentic-pm";
