//! Build and validation failures.

use stepgraph::{chain, ChoiceRule, GraphError, State, StateGraph, TaskState, WaitDuration};

/// **Scenario**: Same id in a Parallel branch and the parent scope is a duplicate.
#[test]
fn duplicate_id_across_branch_fails() {
    let mut parallel = State::parallel("P");
    parallel.add_branch(State::pass("Twin")).unwrap();
    let err = chain(vec![parallel, State::pass("Twin")]).unwrap_err();
    assert_eq!(err, GraphError::DuplicateId("Twin".into()));
}

/// **Scenario**: Inline choice target reusing a chained id is a duplicate.
#[test]
fn duplicate_id_through_inline_target_fails() {
    let mut choice = State::choice("C");
    choice
        .add_choice(ChoiceRule::boolean_equals("$.x", true), State::pass("Start"))
        .unwrap()
        .set_default(State::succeed("End"))
        .unwrap();
    let err = chain(vec![State::pass("Start"), choice]).unwrap_err();
    assert_eq!(err, GraphError::DuplicateId("Start".into()));
}

/// **Scenario**: Separately added chains that share an id only meet at build time.
#[test]
fn duplicate_id_across_builder_chains_fails() {
    let mut choice = State::choice("C");
    choice
        .add_choice(ChoiceRule::boolean_equals("$.x", true), State::pass("Start"))
        .unwrap()
        .set_default(State::succeed("End"))
        .unwrap();
    let mut builder = StateGraph::builder();
    builder
        .add_chain(chain(vec![State::pass("Start"), State::succeed("Done")]).unwrap())
        .add_state(choice)
        .start_at("Start");
    assert_eq!(
        builder.build().unwrap_err(),
        GraphError::DuplicateId("Start".into())
    );
}

/// **Scenario**: A state added to the builder but never targeted is unreachable.
#[test]
fn unreachable_state_fails() {
    let mut builder = StateGraph::builder();
    builder
        .add_chain(chain(vec![State::pass("A"), State::succeed("B")]).unwrap())
        .add_state(State::pass("Island"))
        .start_at("A");
    assert_eq!(
        builder.build().unwrap_err(),
        GraphError::UnreachableState("Island".into())
    );
}

/// **Scenario**: A Choice with no rules cannot be built.
#[test]
fn choice_without_rules_fails() {
    let err = StateGraph::from_chain(State::choice("Empty")).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

/// **Scenario**: Paths must be reference paths starting with `$`.
#[test]
fn invalid_paths_fail() {
    let err = StateGraph::from_chain(State::pass("P").with_input_path("input")).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
    let err = StateGraph::from_chain(State::wait(
        "W",
        WaitDuration::SecondsPath("seconds".into()),
    ))
    .unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

/// **Scenario**: Heartbeat must be shorter than the task timeout.
#[test]
fn heartbeat_not_below_timeout_fails() {
    let task = TaskState::new("arn:aws:lambda:us-east-1:000000000000:function:f")
        .with_timeout_seconds(10)
        .with_heartbeat_seconds(10);
    let err = StateGraph::from_chain(State::new("T", task)).unwrap_err();
    assert!(matches!(err, GraphError::InvalidPolicy(_)));
}

/// **Scenario**: Parameters must be a JSON object.
#[test]
fn non_object_parameters_fail() {
    let err = StateGraph::from_chain(
        State::task("T", "arn").with_parameters(serde_json::json!([1, 2])),
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

/// **Scenario**: Choice rule variables must be paths.
#[test]
fn choice_rule_variable_must_be_path() {
    let mut choice = State::choice("C");
    let err = choice
        .add_choice(ChoiceRule::boolean_equals("flag", true), State::succeed("S"))
        .unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}
