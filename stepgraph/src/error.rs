//! Graph construction and validation errors.
//!
//! Returned by the chain builder, `StateGraphBuilder::build`, policy attachment and
//! `StateGraph::validate`. Serializing an already-built graph never fails.

use thiserror::Error;

/// Error when building or validating a state graph.
///
/// Every variant is raised before a document is rendered: while chaining states,
/// attaching policies or compiling a `StateGraph`. The message names the offending
/// state id (or policy) so it can be surfaced as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Invalid chaining or state configuration (e.g. a Succeed state given a next
    /// state, a transition naming an unknown state, a Choice with no rules).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The same state id appears twice in the graph, nested branches included.
    #[error("duplicate state id: {0}")]
    DuplicateId(String),

    /// A state cannot be reached from the entry state.
    #[error("state is unreachable from the entry state: {0}")]
    UnreachableState(String),

    /// A retry/catch policy or a numeric state field is out of range.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

impl GraphError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy(msg.into())
    }
}
