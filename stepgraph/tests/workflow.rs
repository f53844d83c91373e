//! Integration tests for the Workflow handle over the in-memory service.
//!
//! Tests are split into modules under `workflow/`:
//! - `common`: workflow fixtures
//! - `lifecycle`: create / update / execute / delete ordering rules
//! - `execution`: describe, history, wait and watch

#[path = "workflow/common.rs"]
mod common;

#[path = "workflow/lifecycle.rs"]
mod lifecycle;

#[path = "workflow/execution.rs"]
mod execution;
