//! Chain: states linked in sequence through their default transitions.
//!
//! `chain([A, B, C])` sets A.Next = B and B.Next = C; C stays unset and becomes
//! `End: true` when the chain is frozen into a [`StateGraph`](super::StateGraph).

use std::collections::HashSet;

use crate::error::GraphError;
use crate::state::State;

/// Ordered, linked, non-empty sequence of states.
///
/// Produced by [`chain`] / [`Chain::new`] or from a single [`State`]. Used as a
/// graph body, a Parallel branch, or an inline Choice/Catch target.
#[derive(Debug, Clone)]
pub struct Chain {
    states: Vec<State>,
}

/// Links `states` in order. See [`Chain::new`].
pub fn chain(states: Vec<State>) -> Result<Chain, GraphError> {
    Chain::new(states)
}

impl Chain {
    /// Links each state's default transition to the next one in the sequence.
    ///
    /// Fails with `Configuration` when the sequence is empty, when a Succeed,
    /// Fail or Choice state is followed by another state, or when a state with an
    /// explicit transition is followed by another state. Fails with `DuplicateId`
    /// when an id appears twice anywhere in the chain, nested targets and branches
    /// included.
    pub fn new(states: Vec<State>) -> Result<Self, GraphError> {
        if states.is_empty() {
            return Err(GraphError::configuration("cannot chain an empty list of states"));
        }
        let mut states = states;
        for i in 1..states.len() {
            let next_id = states[i].id().to_string();
            states[i - 1].link_to(&next_id)?;
        }
        let chain = Self { states };
        chain.check_unique_ids()?;
        Ok(chain)
    }

    /// Appends another state or chain, linking this chain's last state to its entry.
    pub fn then(self, next: impl Into<Chain>) -> Result<Self, GraphError> {
        let next = next.into();
        let mut states = self.states;
        if let Some(last) = states.last_mut() {
            last.link_to(next.start_id())?;
        }
        states.extend(next.states);
        let chain = Self { states };
        chain.check_unique_ids()?;
        Ok(chain)
    }

    /// Id of the first state.
    pub fn start_id(&self) -> &str {
        self.states[0].id()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; a chain holds at least one state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn into_states(self) -> Vec<State> {
        self.states
    }

    fn check_unique_ids(&self) -> Result<(), GraphError> {
        let mut ids = Vec::new();
        for state in &self.states {
            state.collect_ids(&mut ids);
        }
        first_duplicate(&ids).map_or(Ok(()), |id| Err(GraphError::DuplicateId(id.to_string())))
    }
}

impl From<State> for Chain {
    fn from(state: State) -> Self {
        Self {
            states: vec![state],
        }
    }
}

/// First id seen twice, in order of appearance.
pub(crate) fn first_duplicate<'a>(ids: &[&'a str]) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.iter().copied().find(|id| !seen.insert(*id))
}
