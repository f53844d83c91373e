//! Kind-specific state fields.
//!
//! `StateKind` is the type tag of a [`State`](super::State) plus whatever that
//! type carries: a Task's resource, a Choice's rules, a Parallel's branches.

use serde_json::Value;

use crate::graph::StateGraph;
use crate::state::{ChoiceRule, NextStep};

/// Resource ARN for the optimized Lambda integration.
pub const LAMBDA_INVOKE_RESOURCE: &str = "arn:aws:states:::lambda:invoke";

/// Resource ARN for Lambda with the callback (task token) pattern.
pub const LAMBDA_INVOKE_CALLBACK_RESOURCE: &str = "arn:aws:states:::lambda:invoke.waitForTaskToken";

/// Value of the `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateType {
    Pass,
    Task,
    Choice,
    Wait,
    Succeed,
    Fail,
    Parallel,
    Map,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Pass => "Pass",
            StateType::Task => "Task",
            StateType::Choice => "Choice",
            StateType::Wait => "Wait",
            StateType::Succeed => "Succeed",
            StateType::Fail => "Fail",
            StateType::Parallel => "Parallel",
            StateType::Map => "Map",
        }
    }

    /// Succeed and Fail end the execution and never carry a transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StateType::Succeed | StateType::Fail)
    }

    /// Kinds that take a default `Next`/`End` transition.
    pub fn has_transition(&self) -> bool {
        !self.is_terminal() && *self != StateType::Choice
    }

    /// Kinds that accept Retry/Catch, ResultPath and Parameters.
    pub fn is_task_like(&self) -> bool {
        matches!(self, StateType::Task | StateType::Parallel | StateType::Map)
    }
}

impl std::fmt::Display for StateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassState {
    pub result: Option<Value>,
}

impl PassState {
    pub fn with_result(result: impl Into<Value>) -> Self {
        Self {
            result: Some(result.into()),
        }
    }
}

/// Unit of work identified by `resource` (a Lambda, activity or service integration ARN).
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub resource: String,
    pub timeout_seconds: Option<u32>,
    /// Must be smaller than `timeout_seconds` when both are set.
    pub heartbeat_seconds: Option<u32>,
}

impl TaskState {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            timeout_seconds: None,
            heartbeat_seconds: None,
        }
    }

    pub fn with_timeout_seconds(mut self, seconds: u32) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_heartbeat_seconds(mut self, seconds: u32) -> Self {
        self.heartbeat_seconds = Some(seconds);
        self
    }
}

/// One rule of a Choice state and the state it leads to.
#[derive(Debug, Clone)]
pub struct ChoiceBranch {
    pub rule: ChoiceRule,
    pub next: NextStep,
}

/// Ordered rules plus an optional default; first matching rule wins at run time.
#[derive(Debug, Clone, Default)]
pub struct ChoiceState {
    pub branches: Vec<ChoiceBranch>,
    pub default: Option<NextStep>,
}

/// How long a Wait state waits. Exactly one is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitDuration {
    Seconds(u64),
    /// ISO-8601 timestamp.
    Timestamp(String),
    SecondsPath(String),
    TimestampPath(String),
}

impl WaitDuration {
    pub(crate) fn field(&self) -> (&'static str, Value) {
        match self {
            WaitDuration::Seconds(s) => ("Seconds", Value::from(*s)),
            WaitDuration::Timestamp(t) => ("Timestamp", Value::String(t.clone())),
            WaitDuration::SecondsPath(p) => ("SecondsPath", Value::String(p.clone())),
            WaitDuration::TimestampPath(p) => ("TimestampPath", Value::String(p.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailState {
    pub error: Option<String>,
    pub cause: Option<String>,
}

impl FailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Ordered, independently rooted branches.
#[derive(Debug, Clone, Default)]
pub struct ParallelState {
    pub branches: Vec<StateGraph>,
}

/// Runs `iterator` for each item selected by `items_path`.
#[derive(Debug, Clone)]
pub struct MapState {
    pub iterator: StateGraph,
    pub items_path: Option<String>,
    /// Zero means no limit.
    pub max_concurrency: Option<u32>,
}

impl MapState {
    pub fn new(iterator: StateGraph) -> Self {
        Self {
            iterator,
            items_path: None,
            max_concurrency: None,
        }
    }

    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.items_path = Some(path.into());
        self
    }

    pub fn with_max_concurrency(mut self, max: u32) -> Self {
        self.max_concurrency = Some(max);
        self
    }
}

/// Type tag and type-specific fields of a state.
#[derive(Debug, Clone)]
pub enum StateKind {
    Pass(PassState),
    Task(TaskState),
    Choice(ChoiceState),
    Wait(WaitDuration),
    Succeed,
    Fail(FailState),
    Parallel(ParallelState),
    Map(MapState),
}

impl StateKind {
    pub fn state_type(&self) -> StateType {
        match self {
            StateKind::Pass(_) => StateType::Pass,
            StateKind::Task(_) => StateType::Task,
            StateKind::Choice(_) => StateType::Choice,
            StateKind::Wait(_) => StateType::Wait,
            StateKind::Succeed => StateType::Succeed,
            StateKind::Fail(_) => StateType::Fail,
            StateKind::Parallel(_) => StateType::Parallel,
            StateKind::Map(_) => StateType::Map,
        }
    }
}

impl From<PassState> for StateKind {
    fn from(s: PassState) -> Self {
        StateKind::Pass(s)
    }
}

impl From<TaskState> for StateKind {
    fn from(s: TaskState) -> Self {
        StateKind::Task(s)
    }
}

impl From<ChoiceState> for StateKind {
    fn from(s: ChoiceState) -> Self {
        StateKind::Choice(s)
    }
}

impl From<WaitDuration> for StateKind {
    fn from(s: WaitDuration) -> Self {
        StateKind::Wait(s)
    }
}

impl From<FailState> for StateKind {
    fn from(s: FailState) -> Self {
        StateKind::Fail(s)
    }
}

impl From<ParallelState> for StateKind {
    fn from(s: ParallelState) -> Self {
        StateKind::Parallel(s)
    }
}

impl From<MapState> for StateKind {
    fn from(s: MapState) -> Self {
        StateKind::Map(s)
    }
}
