//! Built state graph: immutable, validated, ready to serialize.
//!
//! Produced by `StateGraphBuilder::build` or `StateGraph::from_chain`. Holds states
//! in hoisting order, an id index and the validation report from build time.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::GraphError;
use crate::graph::builder::StateGraphBuilder;
use crate::graph::chain::Chain;
use crate::graph::serialize;
use crate::graph::validate::{self, ValidationReport, ValidationWarning};
use crate::state::State;

/// Immutable workflow graph with a single entry state.
///
/// Used as a workflow definition, a Parallel branch or a Map iterator. All inline
/// targets have been hoisted, so every transition is an id in [`StateGraph::state`].
#[derive(Debug, Clone)]
pub struct StateGraph {
    pub(super) start_at: String,
    pub(super) states: Vec<State>,
    pub(super) index: HashMap<String, usize>,
    pub(super) report: ValidationReport,
}

impl StateGraph {
    /// Builds a graph whose entry is the chain's first state.
    pub fn from_chain(chain: impl Into<Chain>) -> Result<Self, GraphError> {
        StateGraphBuilder::from_chain(chain).build()
    }

    pub fn builder() -> StateGraphBuilder {
        StateGraphBuilder::new()
    }

    pub fn start_at(&self) -> &str {
        &self.start_at
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.index.get(id).map(|&i| &self.states[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// States of this scope (not nested branches) in hoisting order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Advisory findings from build time (missing Choice default, no reachable end).
    pub fn warnings(&self) -> &[ValidationWarning] {
        self.report.warnings()
    }

    /// Re-runs the validator on the frozen graph.
    pub fn validate(&self) -> Result<ValidationReport, GraphError> {
        validate::validate(&self.start_at, &self.states, &self.index)
    }

    /// Renders the graph as a States-language document (`StartAt`, `States`).
    pub fn to_document(&self) -> Value {
        serialize::render_graph(self)
    }

    /// JSON text of [`StateGraph::to_document`]; identical on every call.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        serialize::to_json(&self.to_document(), pretty)
    }

    /// Every state id in this graph and in nested branches/iterators.
    pub fn all_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    pub(crate) fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        for state in &self.states {
            state.collect_ids(out);
        }
    }
}
