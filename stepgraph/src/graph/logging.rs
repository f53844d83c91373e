//! Logging helpers for graph building and validation.
//!
//! Structured `tracing` events: one per hoisted state at `trace`, one per built
//! graph at `debug`, one per advisory finding at `warn`.

use crate::graph::validate::ValidationWarning;

/// Log a state entering the graph scope and how many inline targets it owned.
pub fn log_state_added(state_id: &str, inline_targets: usize) {
    tracing::trace!(state_id = state_id, inline_targets, "state added to graph");
}

/// Log a successfully built graph.
pub fn log_graph_built(start_at: &str, states: usize, warnings: usize) {
    tracing::debug!(start_at = start_at, states, warnings, "state graph built");
}

/// Log an advisory validation finding.
pub fn log_validation_warning(warning: &ValidationWarning) {
    tracing::warn!(%warning, "graph validation warning");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Each helper emits its event with no subscriber installed.
    #[test]
    fn helpers_log_without_subscriber() {
        log_state_added("A", 0);
        log_graph_built("A", 1, 0);
        log_validation_warning(&ValidationWarning::MissingChoiceDefault("C".into()));
    }
}
