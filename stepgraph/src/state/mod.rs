//! States: named nodes of a workflow graph.
//!
//! A [`State`] has an id, a [`StateKind`] (type tag plus type-specific fields),
//! optional common fields (comment, paths, parameters), a [`Transition`] and, for
//! Task/Parallel/Map, ordered retry and catch policies.
//!
//! States are assembled with [`Chain`](crate::graph::Chain) or
//! [`StateGraphBuilder`](crate::graph::StateGraphBuilder) and frozen into a
//! [`StateGraph`](crate::graph::StateGraph).

mod choice;
mod kind;
mod policy;

pub use choice::{ChoiceRule, Comparison, ComparisonOperator, Operand};
pub use kind::{
    ChoiceBranch, ChoiceState, FailState, MapState, ParallelState, PassState, StateKind,
    StateType, TaskState, WaitDuration, LAMBDA_INVOKE_CALLBACK_RESOURCE, LAMBDA_INVOKE_RESOURCE,
};
pub use policy::{CatchPolicy, RetryPolicy, STATES_ALL};

use serde_json::Value;

use crate::error::GraphError;
use crate::graph::{Chain, StateGraph};

/// Default transition of a state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition {
    /// Not linked yet; becomes `End` when the graph is built.
    #[default]
    Unset,
    /// Explicit next state id.
    Next(String),
    End,
}

/// Target of a choice rule, choice default or catcher.
///
/// `Inline` targets are hoisted into the enclosing graph scope when the graph is
/// built; `Id` refers to a state defined elsewhere in the same scope (this is how
/// loops are expressed).
#[derive(Debug, Clone)]
pub enum NextStep {
    Inline(Chain),
    Id(String),
}

impl NextStep {
    /// Id of the state this step leads to.
    pub fn target_id(&self) -> &str {
        match self {
            NextStep::Inline(chain) => chain.start_id(),
            NextStep::Id(id) => id,
        }
    }

    /// Replaces an inline target with a reference to its entry and returns the chain.
    pub(crate) fn detach(&mut self) -> Option<Chain> {
        let id = match self {
            NextStep::Id(_) => return None,
            NextStep::Inline(chain) => chain.start_id().to_string(),
        };
        match std::mem::replace(self, NextStep::Id(id)) {
            NextStep::Inline(chain) => Some(chain),
            NextStep::Id(_) => None,
        }
    }
}

impl From<State> for NextStep {
    fn from(state: State) -> Self {
        NextStep::Inline(Chain::from(state))
    }
}

impl From<Chain> for NextStep {
    fn from(chain: Chain) -> Self {
        NextStep::Inline(chain)
    }
}

impl From<&str> for NextStep {
    fn from(id: &str) -> Self {
        NextStep::Id(id.to_string())
    }
}

impl From<String> for NextStep {
    fn from(id: String) -> Self {
        NextStep::Id(id)
    }
}

/// A named node in a workflow graph.
#[derive(Debug, Clone)]
pub struct State {
    id: String,
    kind: StateKind,
    comment: Option<String>,
    input_path: Option<String>,
    output_path: Option<String>,
    result_path: Option<String>,
    parameters: Option<Value>,
    transition: Transition,
    retry: Vec<RetryPolicy>,
    catch: Vec<CatchPolicy>,
}

impl State {
    pub fn new(id: impl Into<String>, kind: impl Into<StateKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            comment: None,
            input_path: None,
            output_path: None,
            result_path: None,
            parameters: None,
            transition: Transition::Unset,
            retry: Vec::new(),
            catch: Vec::new(),
        }
    }

    pub fn pass(id: impl Into<String>) -> Self {
        Self::new(id, PassState::default())
    }

    pub fn task(id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::new(id, TaskState::new(resource))
    }

    /// Task invoking a Lambda function through the optimized integration.
    ///
    /// `parameters` is rendered as-is (typically `FunctionName` and `Payload`).
    pub fn lambda(id: impl Into<String>, parameters: Value) -> Self {
        Self::task(id, LAMBDA_INVOKE_RESOURCE).with_parameters(parameters)
    }

    pub fn choice(id: impl Into<String>) -> Self {
        Self::new(id, ChoiceState::default())
    }

    pub fn wait(id: impl Into<String>, duration: WaitDuration) -> Self {
        Self::new(id, duration)
    }

    pub fn succeed(id: impl Into<String>) -> Self {
        Self::new(id, StateKind::Succeed)
    }

    pub fn fail(id: impl Into<String>) -> Self {
        Self::new(id, FailState::default())
    }

    pub fn parallel(id: impl Into<String>) -> Self {
        Self::new(id, ParallelState::default())
    }

    pub fn map(id: impl Into<String>, iterator: StateGraph) -> Self {
        Self::new(id, MapState::new(iterator))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_input_path(mut self, path: impl Into<String>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    /// Free-form parameters; must be a JSON object (checked at build time).
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets an explicit next state by id.
    ///
    /// Fails with `Configuration` for Succeed, Fail and Choice states. A state with
    /// an explicit next cannot be linked again by a chain.
    pub fn with_next(mut self, id: impl Into<String>) -> Result<Self, GraphError> {
        self.set_transition(Transition::Next(id.into()))?;
        Ok(self)
    }

    /// Marks the state as terminal (`End: true`).
    pub fn with_end(mut self) -> Result<Self, GraphError> {
        self.set_transition(Transition::End)?;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    pub fn state_type(&self) -> StateType {
        self.kind.state_type()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn input_path(&self) -> Option<&str> {
        self.input_path.as_deref()
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    pub fn result_path(&self) -> Option<&str> {
        self.result_path.as_deref()
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.parameters.as_ref()
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn retries(&self) -> &[RetryPolicy] {
        &self.retry
    }

    pub fn catches(&self) -> &[CatchPolicy] {
        &self.catch
    }

    /// True for Succeed/Fail and for states ending with `End: true`.
    pub fn is_end(&self) -> bool {
        self.state_type().is_terminal() || self.transition == Transition::End
    }

    /// Appends a retrier, preserving attachment order.
    ///
    /// Only Task, Parallel and Map accept retriers (`Configuration` otherwise). The
    /// policy is validated (`InvalidPolicy`), and nothing may follow a
    /// `States.ALL` retrier.
    pub fn add_retry(&mut self, policy: RetryPolicy) -> Result<&mut Self, GraphError> {
        self.require_task_like("Retry")?;
        policy.validate()?;
        if self.retry.last().map(RetryPolicy::matches_all).unwrap_or(false) {
            return Err(GraphError::invalid_policy(format!(
                "state '{}': a {} retrier must be the last one",
                self.id, STATES_ALL
            )));
        }
        self.retry.push(policy);
        Ok(self)
    }

    /// Appends a catcher, preserving attachment order. Same rules as [`State::add_retry`].
    pub fn add_catch(&mut self, policy: CatchPolicy) -> Result<&mut Self, GraphError> {
        self.require_task_like("Catch")?;
        policy.validate()?;
        if self.catch.last().map(CatchPolicy::matches_all).unwrap_or(false) {
            return Err(GraphError::invalid_policy(format!(
                "state '{}': a {} catcher must be the last one",
                self.id, STATES_ALL
            )));
        }
        self.catch.push(policy);
        Ok(self)
    }

    /// Appends a rule/target pair to a Choice state, preserving insertion order.
    pub fn add_choice(
        &mut self,
        rule: ChoiceRule,
        next: impl Into<NextStep>,
    ) -> Result<&mut Self, GraphError> {
        rule.validate()?;
        let id = self.id.clone();
        match &mut self.kind {
            StateKind::Choice(choice) => {
                choice.branches.push(ChoiceBranch {
                    rule,
                    next: next.into(),
                });
                Ok(self)
            }
            other => Err(unsupported(&id, other.state_type(), "Choices")),
        }
    }

    /// Sets the target taken when no Choice rule matches.
    pub fn set_default(&mut self, next: impl Into<NextStep>) -> Result<&mut Self, GraphError> {
        let id = self.id.clone();
        match &mut self.kind {
            StateKind::Choice(choice) => {
                choice.default = Some(next.into());
                Ok(self)
            }
            other => Err(unsupported(&id, other.state_type(), "Default")),
        }
    }

    /// Appends a branch to a Parallel state.
    ///
    /// The branch is built into its own [`StateGraph`] immediately, so it must
    /// satisfy the graph invariants on its own.
    pub fn add_branch(&mut self, branch: impl Into<Chain>) -> Result<&mut Self, GraphError> {
        let id = self.id.clone();
        let state_type = self.state_type();
        match &mut self.kind {
            StateKind::Parallel(parallel) => {
                let graph = StateGraph::from_chain(branch)?;
                parallel.branches.push(graph);
                Ok(self)
            }
            _ => Err(unsupported(&id, state_type, "Branches")),
        }
    }

    fn require_task_like(&self, field: &str) -> Result<(), GraphError> {
        if self.state_type().is_task_like() {
            Ok(())
        } else {
            Err(unsupported(&self.id, self.state_type(), field))
        }
    }

    pub(crate) fn set_transition(&mut self, transition: Transition) -> Result<(), GraphError> {
        if !self.state_type().has_transition() {
            return Err(GraphError::configuration(format!(
                "state '{}' of type {} does not support a next transition",
                self.id,
                self.state_type()
            )));
        }
        self.transition = transition;
        Ok(())
    }

    /// Links the default transition to `next_id`.
    ///
    /// Fails when the state is Succeed/Fail/Choice or already has an explicit
    /// transition.
    pub(crate) fn link_to(&mut self, next_id: &str) -> Result<(), GraphError> {
        if self.transition != Transition::Unset && self.state_type().has_transition() {
            return Err(GraphError::configuration(format!(
                "state '{}' already has an explicit transition; cannot chain it to '{}'",
                self.id, next_id
            )));
        }
        self.set_transition(Transition::Next(next_id.to_string()))
    }

    /// Turns an unset transition into `End`. No-op for other states.
    pub(crate) fn close(&mut self) {
        if self.transition == Transition::Unset && self.state_type().has_transition() {
            self.transition = Transition::End;
        }
    }

    /// Inline targets owned by this state, in traversal order.
    pub(crate) fn inline_targets_mut(&mut self) -> Vec<&mut NextStep> {
        let mut targets = Vec::new();
        if let StateKind::Choice(choice) = &mut self.kind {
            for branch in &mut choice.branches {
                targets.push(&mut branch.next);
            }
            if let Some(default) = &mut choice.default {
                targets.push(default);
            }
        }
        for catch in &mut self.catch {
            targets.push(catch.next_mut());
        }
        targets
    }

    /// Ids this state may transition to, in the order: choice rules, default,
    /// next, catchers.
    pub fn successors(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let StateKind::Choice(choice) = &self.kind {
            out.extend(choice.branches.iter().map(|b| b.next.target_id()));
            if let Some(default) = &choice.default {
                out.push(default.target_id());
            }
        }
        if let Transition::Next(id) = &self.transition {
            out.push(id.as_str());
        }
        out.extend(self.catch.iter().map(|c| c.next().target_id()));
        out
    }

    /// Every state id owned by this state: its own, inline targets (recursively)
    /// and nested branch/iterator graphs.
    pub(crate) fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.id);
        let mut visit = |step: &'a NextStep| {
            if let NextStep::Inline(chain) = step {
                for state in chain.states() {
                    state.collect_ids(out);
                }
            }
        };
        if let StateKind::Choice(choice) = &self.kind {
            for branch in &choice.branches {
                visit(&branch.next);
            }
            if let Some(default) = &choice.default {
                visit(default);
            }
        }
        for catch in &self.catch {
            visit(catch.next());
        }
        match &self.kind {
            StateKind::Parallel(parallel) => {
                for branch in &parallel.branches {
                    branch.collect_ids(out);
                }
            }
            StateKind::Map(map) => map.iterator.collect_ids(out),
            _ => {}
        }
    }

    /// Field-level checks run when the state is frozen into a graph.
    pub(crate) fn check(&self) -> Result<(), GraphError> {
        let ty = self.state_type();
        if self.id.is_empty() || self.id.chars().count() > 80 {
            return Err(GraphError::configuration(format!(
                "state id must be 1 to 80 characters: '{}'",
                self.id
            )));
        }
        if ty == StateType::Fail && (self.input_path.is_some() || self.output_path.is_some()) {
            return Err(unsupported(&self.id, ty, "InputPath/OutputPath"));
        }
        if !ty.is_task_like() && ty != StateType::Pass {
            if self.result_path.is_some() {
                return Err(unsupported(&self.id, ty, "ResultPath"));
            }
            if self.parameters.is_some() {
                return Err(unsupported(&self.id, ty, "Parameters"));
            }
        }
        for (field, path) in [
            ("InputPath", &self.input_path),
            ("OutputPath", &self.output_path),
            ("ResultPath", &self.result_path),
        ] {
            if let Some(p) = path {
                check_path(&self.id, field, p)?;
            }
        }
        if let Some(params) = &self.parameters {
            if !params.is_object() {
                return Err(GraphError::configuration(format!(
                    "state '{}': Parameters must be a JSON object",
                    self.id
                )));
            }
        }
        match &self.kind {
            StateKind::Task(task) => check_task(&self.id, task),
            StateKind::Choice(choice) if choice.branches.is_empty() => {
                Err(GraphError::configuration(format!(
                    "Choice state '{}' must have at least one rule",
                    self.id
                )))
            }
            StateKind::Wait(WaitDuration::SecondsPath(p))
            | StateKind::Wait(WaitDuration::TimestampPath(p)) => check_path(&self.id, "Wait", p),
            StateKind::Wait(WaitDuration::Timestamp(t)) if t.trim().is_empty() => {
                Err(GraphError::configuration(format!(
                    "Wait state '{}': Timestamp must not be empty",
                    self.id
                )))
            }
            StateKind::Parallel(parallel) if parallel.branches.is_empty() => {
                Err(GraphError::configuration(format!(
                    "Parallel state '{}' must have at least one branch",
                    self.id
                )))
            }
            StateKind::Map(map) => match &map.items_path {
                Some(p) => check_path(&self.id, "ItemsPath", p),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

fn check_task(id: &str, task: &TaskState) -> Result<(), GraphError> {
    if task.resource.trim().is_empty() {
        return Err(GraphError::configuration(format!(
            "Task state '{}' must have a Resource",
            id
        )));
    }
    if task.timeout_seconds == Some(0) {
        return Err(GraphError::invalid_policy(format!(
            "Task state '{}': TimeoutSeconds must be positive",
            id
        )));
    }
    if task.heartbeat_seconds == Some(0) {
        return Err(GraphError::invalid_policy(format!(
            "Task state '{}': HeartbeatSeconds must be positive",
            id
        )));
    }
    if let (Some(timeout), Some(heartbeat)) = (task.timeout_seconds, task.heartbeat_seconds) {
        if heartbeat >= timeout {
            return Err(GraphError::invalid_policy(format!(
                "Task state '{}': HeartbeatSeconds ({}) must be smaller than TimeoutSeconds ({})",
                id, heartbeat, timeout
            )));
        }
    }
    Ok(())
}

fn check_path(id: &str, field: &str, path: &str) -> Result<(), GraphError> {
    if path.starts_with('$') {
        Ok(())
    } else {
        Err(GraphError::configuration(format!(
            "state '{}': {} must be a path starting with '$', got '{}'",
            id, field, path
        )))
    }
}

fn unsupported(id: &str, ty: StateType, field: &str) -> GraphError {
    GraphError::configuration(format!(
        "state '{}' of type {} does not support {}",
        id, ty, field
    ))
}
