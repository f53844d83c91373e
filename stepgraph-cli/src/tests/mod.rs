//! Unit tests for stepgraph-cli, organized by module.
//!
//! Tests are BDD-style: each documents its scenario in a doc comment.
//! Tests that touch `STEPGRAPH_*` variables take [`env_lock`] so they run serially.

use std::sync::{Mutex, MutexGuard, OnceLock};


static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serializes tests that set or remove environment variables.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets (or removes, for `None`) `vars`, runs `f`, then restores the previous values.
pub(crate) fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock();
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
        .collect();
    for (k, v) in vars {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
    let out = f();
    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(&k, v),
            None => std::env::remove_var(&k),
        }
    }
    out
}

pub(crate) const ALL_VARS: [&str; 6] = [
    "STEPGRAPH_ROLE_ARN",
    "STEPGRAPH_WORKFLOW_NAME",
    "STEPGRAPH_LAMBDA_FUNCTION",
    "STEPGRAPH_POLL_INTERVAL_MS",
    "STEPGRAPH_MAX_RETRIES",
    "STEPGRAPH_CALL_TIMEOUT_MS",
];
