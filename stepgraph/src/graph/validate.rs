//! Structural validation of a graph scope.
//!
//! Hard failures: unknown entry, transitions naming unknown states, unreachable
//! states. Advisory findings (returned in [`ValidationReport`]; `build` logs a
//! graph's own findings once at `warn`): Choice states without a default and
//! states from which no end state can be reached. Cycles themselves are allowed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::GraphError;
use crate::state::{State, StateKind};

/// Advisory finding; never blocks building or rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Choice state without `Default`; an input matching no rule fails the
    /// execution with `States.NoChoiceMatched`.
    MissingChoiceDefault(String),
    /// No Succeed/Fail/End state is reachable from this state (a loop with no exit).
    NoTerminalReachable(String),
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MissingChoiceDefault(id) => {
                write!(
                    f,
                    "Choice state '{}' has no Default; unmatched input fails the execution",
                    id
                )
            }
            ValidationWarning::NoTerminalReachable(id) => {
                write!(f, "no end state is reachable from state '{}'", id)
            }
        }
    }
}

/// Result of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    warnings: Vec<ValidationWarning>,
    /// Leading entries of `warnings` that belong to this scope, not to branches.
    own: usize,
}

impl ValidationReport {
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Warnings about states of this scope; nested branch findings excluded.
    pub(crate) fn own_warnings(&self) -> &[ValidationWarning] {
        &self.warnings[..self.own]
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validates one graph scope. Nested branches were validated when they were built;
/// their warnings are carried over into this report.
pub(crate) fn validate(
    start_at: &str,
    states: &[State],
    index: &HashMap<String, usize>,
) -> Result<ValidationReport, GraphError> {
    if !index.contains_key(start_at) {
        return Err(GraphError::configuration(format!(
            "entry state '{}' is not defined",
            start_at
        )));
    }

    for state in states {
        for target in state.successors() {
            if !index.contains_key(target) {
                return Err(GraphError::configuration(format!(
                    "state '{}' transitions to unknown state '{}'",
                    state.id(),
                    target
                )));
            }
        }
    }

    let reachable = reachable_from(start_at, states, index);
    if let Some(orphan) = states.iter().find(|s| !reachable.contains(s.id())) {
        return Err(GraphError::UnreachableState(orphan.id().to_string()));
    }

    let mut warnings = Vec::new();
    for state in states {
        if let StateKind::Choice(choice) = state.kind() {
            if choice.default.is_none() {
                warnings.push(ValidationWarning::MissingChoiceDefault(state.id().to_string()));
            }
        }
    }
    let can_finish = can_reach_end(states, index);
    for state in states {
        if !can_finish.contains(state.id()) {
            warnings.push(ValidationWarning::NoTerminalReachable(state.id().to_string()));
        }
    }
    let own = warnings.len();
    for state in states {
        match state.kind() {
            StateKind::Parallel(parallel) => {
                for branch in &parallel.branches {
                    warnings.extend(branch.warnings().iter().cloned());
                }
            }
            StateKind::Map(map) => warnings.extend(map.iterator.warnings().iter().cloned()),
            _ => {}
        }
    }

    Ok(ValidationReport { warnings, own })
}

fn reachable_from<'a>(
    start_at: &'a str,
    states: &'a [State],
    index: &HashMap<String, usize>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![start_at];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(&i) = index.get(id) {
            stack.extend(states[i].successors());
        }
    }
    seen
}

/// Ids of states from which some end state is reachable (backward fixpoint).
fn can_reach_end<'a>(states: &'a [State], index: &HashMap<String, usize>) -> HashSet<&'a str> {
    let mut done: HashSet<&str> = states.iter().filter(|s| s.is_end()).map(State::id).collect();
    loop {
        let before = done.len();
        for state in states {
            if done.contains(state.id()) {
                continue;
            }
            let exits = state
                .successors()
                .into_iter()
                .any(|t| index.contains_key(t) && done.contains(t));
            if exits {
                done.insert(state.id());
            }
        }
        if done.len() == before {
            return done;
        }
    }
}
