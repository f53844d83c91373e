//! Walks a rendered definition to produce a plausible execution trace.
//!
//! Used by the in-memory service only. Data flow is simplified: Pass `Result`
//! replaces the payload, Parallel/Map collect branch outputs into an array and
//! every other state passes its input through. Choice rules support the
//! String/Numeric/Boolean/Timestamp equality and numeric ordering operators,
//! `IsPresent`, `IsNull` and `And`/`Or`/`Not`; unsupported operators never match.

use std::cmp::Ordering;

use serde_json::{json, Value};

use crate::service::HistoryEventKind;

/// Upper bound on state transitions per execution (loops without an exit).
const MAX_TRANSITIONS: usize = 1000;

const TASK_FAILED: &str = "States.TaskFailed";

pub(crate) struct Step {
    pub kind: HistoryEventKind,
    pub state_name: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Failure {
    pub error: String,
    pub cause: String,
}

impl Failure {
    fn new(error: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            cause: cause.into(),
        }
    }

    fn runtime(cause: impl Into<String>) -> Self {
        Self::new("States.Runtime", cause)
    }
}

pub(crate) struct Trace {
    pub steps: Vec<Step>,
    pub outcome: Result<Value, Failure>,
}

/// Runs `definition` against `input`. With `fail_tasks`, every Task state fails
/// with `States.TaskFailed` after exhausting its matching retrier.
pub(crate) fn run(definition: &Value, input: &Value, fail_tasks: bool) -> Trace {
    let mut walker = Walker {
        fail_tasks,
        transitions: 0,
        steps: Vec::new(),
    };
    let outcome = walker.run_scope(definition, input.clone());
    Trace {
        steps: walker.steps,
        outcome,
    }
}

/// Resolves a simple reference path (`$`, `$.a.b`) against `data`.
pub(crate) fn resolve<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let rest = path.strip_prefix('$')?;
    rest.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(data, |value, key| value.get(key))
}

struct Walker {
    fail_tasks: bool,
    transitions: usize,
    steps: Vec<Step>,
}

impl Walker {
    fn push(&mut self, kind: HistoryEventKind, state: &str, details: Value) {
        self.steps.push(Step {
            kind,
            state_name: Some(state.to_string()),
            details: Some(details),
        });
    }

    fn run_scope(&mut self, scope: &Value, input: Value) -> Result<Value, Failure> {
        let states = scope
            .get("States")
            .and_then(Value::as_object)
            .ok_or_else(|| Failure::runtime("definition has no States"))?;
        let mut current = scope
            .get("StartAt")
            .and_then(Value::as_str)
            .ok_or_else(|| Failure::runtime("definition has no StartAt"))?
            .to_string();
        let mut data = input;

        loop {
            self.transitions += 1;
            if self.transitions > MAX_TRANSITIONS {
                return Err(Failure::runtime(format!(
                    "exceeded {} state transitions",
                    MAX_TRANSITIONS
                )));
            }
            let node = states
                .get(&current)
                .ok_or_else(|| Failure::runtime(format!("state '{}' is not defined", current)))?;
            let ty = node.get("Type").and_then(Value::as_str).unwrap_or_default();
            self.push(
                HistoryEventKind::StateEntered,
                &current,
                json!({"type": ty, "input": data}),
            );

            let mut redirect = None;
            match ty {
                "Succeed" => {
                    self.push(HistoryEventKind::StateExited, &current, json!({"output": data}));
                    return Ok(data);
                }
                "Fail" => {
                    let field =
                        |name: &str| node.get(name).and_then(Value::as_str).unwrap_or_default();
                    let error = match field("Error") {
                        "" => "States.Fail",
                        e => e,
                    };
                    return Err(Failure::new(error, field("Cause")));
                }
                "Pass" => {
                    if let Some(result) = node.get("Result") {
                        data = result.clone();
                    }
                }
                "Choice" => match choose(node, &data) {
                    Some(next) => redirect = Some(next),
                    None => {
                        return Err(Failure::new(
                            "States.NoChoiceMatched",
                            format!("no Choice rule matched in state '{}'", current),
                        ))
                    }
                },
                "Task" if self.fail_tasks => {
                    let failure =
                        Failure::new(TASK_FAILED, format!("task state '{}' failed", current));
                    for attempt in 1..=attempts(node, TASK_FAILED) {
                        self.push(
                            HistoryEventKind::TaskFailed,
                            &current,
                            json!({"error": TASK_FAILED, "attempt": attempt}),
                        );
                    }
                    redirect = Some(catch_target(node, failure)?);
                }
                "Parallel" => {
                    let branches = node.get("Branches").and_then(Value::as_array);
                    let mut outputs = Vec::new();
                    for branch in branches.into_iter().flatten() {
                        match self.run_scope(branch, data.clone()) {
                            Ok(out) => outputs.push(out),
                            Err(failure) => {
                                redirect = Some(catch_target(node, failure)?);
                                break;
                            }
                        }
                    }
                    if redirect.is_none() {
                        data = Value::Array(outputs);
                    }
                }
                "Map" => {
                    let path = node.get("ItemsPath").and_then(Value::as_str).unwrap_or("$");
                    let items = resolve(&data, path)
                        .and_then(Value::as_array)
                        .cloned()
                        .ok_or_else(|| {
                            Failure::runtime(format!("ItemsPath '{}' is not an array", path))
                        })?;
                    let iterator = node
                        .get("Iterator")
                        .ok_or_else(|| Failure::runtime("Map state has no Iterator"))?;
                    let mut outputs = Vec::with_capacity(items.len());
                    for item in items {
                        match self.run_scope(iterator, item) {
                            Ok(out) => outputs.push(out),
                            Err(failure) => {
                                redirect = Some(catch_target(node, failure)?);
                                break;
                            }
                        }
                    }
                    if redirect.is_none() {
                        data = Value::Array(outputs);
                    }
                }
                _ => {}
            }

            self.push(HistoryEventKind::StateExited, &current, json!({"output": data}));
            if let Some(next) = redirect {
                current = next;
                continue;
            }
            match node.get("Next").and_then(Value::as_str) {
                Some(next) => current = next.to_string(),
                None => return Ok(data),
            }
        }
    }
}

fn error_matches(policy: &Value, error: &str) -> bool {
    policy
        .get("ErrorEquals")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .any(|e| e == error || e == "States.ALL")
}

/// 1 + `MaxAttempts` of the first retrier matching `error`.
fn attempts(node: &Value, error: &str) -> u64 {
    node.get("Retry")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|r| error_matches(r, error))
        .map_or(1, |r| r.get("MaxAttempts").and_then(Value::as_u64).unwrap_or(3) + 1)
}

/// Next state of the first catcher matching the failure, or the failure itself.
fn catch_target(node: &Value, failure: Failure) -> Result<String, Failure> {
    node.get("Catch")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|c| error_matches(c, &failure.error))
        .and_then(|c| c.get("Next").and_then(Value::as_str))
        .map(String::from)
        .ok_or(failure)
}

fn choose(node: &Value, data: &Value) -> Option<String> {
    let rules = node.get("Choices").and_then(Value::as_array);
    rules
        .into_iter()
        .flatten()
        .find(|rule| rule_matches(rule, data))
        .or_else(|| node.get("Default"))
        .and_then(|target| match target {
            Value::String(id) => Some(id.clone()),
            rule => rule.get("Next").and_then(Value::as_str).map(String::from),
        })
}

fn rule_matches(rule: &Value, data: &Value) -> bool {
    if let Some(all) = rule.get("And").and_then(Value::as_array) {
        return all.iter().all(|r| rule_matches(r, data));
    }
    if let Some(any) = rule.get("Or").and_then(Value::as_array) {
        return any.iter().any(|r| rule_matches(r, data));
    }
    if let Some(inner) = rule.get("Not") {
        return !rule_matches(inner, data);
    }
    let Some(variable) = rule.get("Variable").and_then(Value::as_str) else {
        return false;
    };
    let Some((operator, expected)) = rule
        .as_object()
        .and_then(|o| o.iter().find(|(k, _)| k.as_str() != "Variable" && k.as_str() != "Next"))
    else {
        return false;
    };
    let actual = resolve(data, variable);
    match (operator.as_str(), actual) {
        ("IsPresent", a) => expected.as_bool() == Some(a.is_some()),
        ("IsNull", a) => expected.as_bool() == Some(matches!(a, Some(Value::Null))),
        (_, None) => false,
        ("StringEquals" | "BooleanEquals" | "TimestampEquals", Some(a)) => a == expected,
        ("NumericEquals", Some(a)) => compare(a, expected) == Some(Ordering::Equal),
        ("NumericLessThan", Some(a)) => compare(a, expected) == Some(Ordering::Less),
        ("NumericGreaterThan", Some(a)) => compare(a, expected) == Some(Ordering::Greater),
        ("NumericLessThanEquals", Some(a)) => {
            matches!(compare(a, expected), Some(Ordering::Less | Ordering::Equal))
        }
        ("NumericGreaterThanEquals", Some(a)) => {
            matches!(compare(a, expected), Some(Ordering::Greater | Ordering::Equal))
        }
        _ => false,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}
