//! Graph builder: states + entry point, then `build` into an immutable `StateGraph`.
//!
//! Add states with `add_state` / `add_chain`, set the entry with `start_at`, then
//! call `build`. Building hoists inline targets (Choice rules, Choice default,
//! Catch fallbacks) into the graph scope, closes unset transitions with
//! `End: true`, checks per-state fields and runs the validator.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::graph::chain::{first_duplicate, Chain};
use crate::graph::logging;
use crate::graph::state_graph::StateGraph;
use crate::graph::validate;
use crate::state::State;

/// Mutable collection of states that `build` freezes into a [`StateGraph`].
///
/// **Interaction**: Accepts `State` / `Chain`; produces `StateGraph`. The builder
/// is consumed by `build`, so a built graph has no hidden shared mutable state.
#[derive(Debug, Default)]
pub struct StateGraphBuilder {
    start_at: Option<String>,
    states: Vec<State>,
}

impl StateGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with a chain; the entry is the chain's first state.
    pub fn from_chain(chain: impl Into<Chain>) -> Self {
        let chain = chain.into();
        Self {
            start_at: Some(chain.start_id().to_string()),
            states: chain.into_states(),
        }
    }

    /// Adds a state as-is. Its transitions are not touched until `build`.
    pub fn add_state(&mut self, state: State) -> &mut Self {
        self.states.push(state);
        self
    }

    /// Adds every state of a chain (already linked among themselves).
    pub fn add_chain(&mut self, chain: impl Into<Chain>) -> &mut Self {
        self.states.extend(chain.into().into_states());
        self
    }

    /// Sets the entry state id.
    pub fn start_at(&mut self, id: impl Into<String>) -> &mut Self {
        self.start_at = Some(id.into());
        self
    }

    /// Freezes the builder into a validated [`StateGraph`].
    ///
    /// Returns `Configuration` when there is no entry or no state, a field is
    /// invalid or a transition names an unknown state; `DuplicateId` when an id
    /// repeats (nested branches included); `UnreachableState` when a state cannot be
    /// reached from the entry; `InvalidPolicy` for out-of-range numeric fields.
    pub fn build(self) -> Result<StateGraph, GraphError> {
        if self.states.is_empty() {
            return Err(GraphError::configuration("graph has no states"));
        }
        let start_at = self
            .start_at
            .ok_or_else(|| GraphError::configuration("graph has no entry state (StartAt)"))?;

        let mut states = Vec::with_capacity(self.states.len());
        for state in self.states {
            hoist(state, &mut states);
        }

        let mut all_ids = Vec::new();
        for state in &states {
            state.collect_ids(&mut all_ids);
        }
        if let Some(id) = first_duplicate(&all_ids) {
            return Err(GraphError::DuplicateId(id.to_string()));
        }

        let mut index = HashMap::with_capacity(states.len());
        for (i, state) in states.iter_mut().enumerate() {
            state.close();
            state.check()?;
            index.insert(state.id().to_string(), i);
        }

        let report = validate::validate(&start_at, &states, &index)?;
        for warning in report.own_warnings() {
            logging::log_validation_warning(warning);
        }
        logging::log_graph_built(&start_at, states.len(), report.warnings().len());

        Ok(StateGraph {
            start_at,
            states,
            index,
            report,
        })
    }
}

/// Pushes `state` and, depth first, the states of its inline targets.
fn hoist(mut state: State, out: &mut Vec<State>) {
    let nested: Vec<Chain> = state
        .inline_targets_mut()
        .into_iter()
        .filter_map(|target| target.detach())
        .collect();
    logging::log_state_added(state.id(), nested.len());
    out.push(state);
    for chain in nested {
        for inner in chain.into_states() {
            hoist(inner, out);
        }
    }
}
