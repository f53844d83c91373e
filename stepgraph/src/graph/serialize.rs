//! Renders a built graph as a States-language document.
//!
//! Field order is fixed per state type and states are emitted in depth-first
//! preorder from `StartAt` (successors in the order choice rules, default, next,
//! catchers), so the same graph always renders to the same bytes.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::graph::StateGraph;
use crate::state::{State, StateKind, Transition};

/// Top-level fields rendered after `StartAt` and `States`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentOptions {
    pub comment: Option<String>,
    pub timeout_seconds: Option<u32>,
}

/// `{"StartAt": ..., "States": {...}}` for a graph scope.
pub fn render_graph(graph: &StateGraph) -> Value {
    render_document(graph, &DocumentOptions::default())
}

/// Graph document plus optional top-level `Comment` and `TimeoutSeconds`.
pub fn render_document(graph: &StateGraph, options: &DocumentOptions) -> Value {
    let mut doc = Map::new();
    doc.insert("StartAt".into(), Value::String(graph.start_at().to_string()));
    let mut states = Map::new();
    for state in traversal_order(graph) {
        states.insert(state.id().to_string(), render_state(state));
    }
    doc.insert("States".into(), Value::Object(states));
    if let Some(comment) = &options.comment {
        doc.insert("Comment".into(), Value::String(comment.clone()));
    }
    if let Some(timeout) = options.timeout_seconds {
        doc.insert("TimeoutSeconds".into(), Value::from(timeout));
    }
    Value::Object(doc)
}

pub fn to_json(document: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
}

/// Depth-first preorder from the entry state. States not reachable from the entry
/// (impossible for a built graph) are appended in hoisting order.
fn traversal_order(graph: &StateGraph) -> Vec<&State> {
    let mut order = Vec::with_capacity(graph.len());
    let mut seen = HashSet::new();
    let mut stack = vec![graph.start_at()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(state) = graph.state(id) {
            order.push(state);
            stack.extend(state.successors().into_iter().rev());
        }
    }
    for state in graph.states() {
        if !seen.contains(state.id()) {
            order.push(state);
        }
    }
    order
}

fn render_state(state: &State) -> Value {
    let mut node = Map::new();
    node.insert("Type".into(), Value::String(state.state_type().as_str().into()));
    if let Some(comment) = state.comment() {
        node.insert("Comment".into(), Value::String(comment.into()));
    }

    match state.kind() {
        StateKind::Pass(pass) => {
            if let Some(result) = &pass.result {
                node.insert("Result".into(), result.clone());
            }
        }
        StateKind::Task(task) => {
            node.insert("Resource".into(), Value::String(task.resource.clone()));
            if let Some(t) = task.timeout_seconds {
                node.insert("TimeoutSeconds".into(), Value::from(t));
            }
            if let Some(h) = task.heartbeat_seconds {
                node.insert("HeartbeatSeconds".into(), Value::from(h));
            }
        }
        StateKind::Choice(choice) => {
            let rules = choice
                .branches
                .iter()
                .map(|b| {
                    let mut rule = b.rule.to_map();
                    rule.insert("Next".into(), Value::String(b.next.target_id().into()));
                    Value::Object(rule)
                })
                .collect();
            node.insert("Choices".into(), Value::Array(rules));
            if let Some(default) = &choice.default {
                node.insert("Default".into(), Value::String(default.target_id().into()));
            }
        }
        StateKind::Wait(duration) => {
            let (field, value) = duration.field();
            node.insert(field.into(), value);
        }
        StateKind::Succeed => {}
        StateKind::Fail(fail) => {
            if let Some(error) = &fail.error {
                node.insert("Error".into(), Value::String(error.clone()));
            }
            if let Some(cause) = &fail.cause {
                node.insert("Cause".into(), Value::String(cause.clone()));
            }
        }
        StateKind::Parallel(parallel) => {
            let branches = parallel.branches.iter().map(render_graph).collect();
            node.insert("Branches".into(), Value::Array(branches));
        }
        StateKind::Map(map) => {
            if let Some(path) = &map.items_path {
                node.insert("ItemsPath".into(), Value::String(path.clone()));
            }
            if let Some(max) = map.max_concurrency {
                node.insert("MaxConcurrency".into(), Value::from(max));
            }
            node.insert("Iterator".into(), render_graph(&map.iterator));
        }
    }

    for (field, value) in [
        ("InputPath", state.input_path()),
        ("OutputPath", state.output_path()),
    ] {
        if let Some(v) = value {
            node.insert(field.into(), Value::String(v.into()));
        }
    }
    if let Some(params) = state.parameters() {
        node.insert("Parameters".into(), params.clone());
    }
    if let Some(path) = state.result_path() {
        node.insert("ResultPath".into(), Value::String(path.into()));
    }

    match state.transition() {
        Transition::Next(id) => {
            node.insert("Next".into(), Value::String(id.clone()));
        }
        Transition::End => {
            node.insert("End".into(), Value::Bool(true));
        }
        Transition::Unset => {}
    }

    if !state.retries().is_empty() {
        let retry = state.retries().iter().map(|r| r.to_value()).collect();
        node.insert("Retry".into(), Value::Array(retry));
    }
    if !state.catches().is_empty() {
        let catch = state.catches().iter().map(|c| c.to_value()).collect();
        node.insert("Catch".into(), Value::Array(catch));
    }
    Value::Object(node)
}
