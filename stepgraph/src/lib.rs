//! # stepgraph
//!
//! Build, validate and serialize Amazon States Language (ASL) workflows in Rust,
//! then drive them through an orchestration service.
//!
//! ## Design Principles
//!
//! - **Explicit builders**: states are linked with [`chain`] / [`Chain`] or collected in
//!   a [`StateGraphBuilder`]; `build` freezes them into an immutable [`StateGraph`].
//! - **Validate before render**: duplicate ids, unknown targets and unreachable
//!   states fail at build time with [`GraphError`]; advisory findings (Choice without
//!   default, loops with no exit) are returned as [`ValidationWarning`]s.
//! - **Deterministic output**: the same graph always renders to the same document
//!   (fixed field order, depth-first state order).
//! - **Service behind a trait**: [`Workflow`] talks to an [`OrchestrationService`];
//!   [`InMemoryOrchestrationService`] simulates the remote side and
//!   [`RetryingService`] adds backoff and per-call timeouts.
//!
//! ## Main Modules
//!
//! - [`state`]: `State`, `StateKind`, `RetryPolicy`, `CatchPolicy`, `ChoiceRule`.
//! - [`graph`]: `Chain`, `StateGraphBuilder`, `StateGraph`, validation and rendering.
//! - [`workflow`]: `Workflow`, `Execution`, lifecycle status.
//! - [`service`]: `OrchestrationService` trait, in-memory and retrying implementations.
//! - [`error`]: `GraphError`.
//!
//! ## Quick Start
//!
//! ```rust
//! use stepgraph::{chain, ChoiceRule, State, StateGraph};
//!
//! let mut choice = State::choice("Is it ready?");
//! choice
//!     .add_choice(ChoiceRule::boolean_equals("$.ready", true), State::succeed("Ready"))
//!     .unwrap()
//!     .set_default(State::fail("NotReady"))
//!     .unwrap();
//!
//! let graph = StateGraph::from_chain(chain(vec![State::pass("Start"), choice]).unwrap()).unwrap();
//! let json = graph.to_json(true).unwrap();
//! assert!(json.contains("\"StartAt\": \"Start\""));
//! ```
//!
//! Run the full tutorial workflow: `cargo run -p stepgraph-examples --example hello_world`

pub mod error;
pub mod graph;
pub mod service;
pub mod state;
pub mod workflow;

pub use error::GraphError;
pub use graph::{
    chain, render_document, Chain, DocumentOptions, StateGraph, StateGraphBuilder,
    ValidationReport, ValidationWarning,
};
pub use service::{
    ExecutionDescription, ExecutionStatus, HistoryEvent, HistoryEventKind,
    InMemoryOrchestrationService, OrchestrationService, RetryConfig, RetryingService, RoleArn,
    ServiceError,
};
pub use state::{
    CatchPolicy, ChoiceRule, ComparisonOperator, FailState, MapState, NextStep, PassState,
    RetryPolicy, State, StateKind, StateType, TaskState, Transition, WaitDuration,
};
pub use workflow::{
    Execution, PollConfig, Workflow, WorkflowDescription, WorkflowError, WorkflowStatus,
};
