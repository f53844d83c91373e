//! Rendered documents: exact hello-world output, branch order, determinism.

use serde_json::json;
use stepgraph::{chain, MapState, State, StateGraph, ValidationWarning};

use crate::common::{hello_world, CHOICE_ID, LAMBDA_ID};

/// **Scenario**: The tutorial workflow renders to the expected document, field
/// order and state order included.
#[test]
fn hello_world_document_matches() {
    let expected = json!({
        "StartAt": "MyPassState",
        "States": {
            "MyPassState": {"Type": "Pass", "Next": CHOICE_ID},
            CHOICE_ID: {
                "Type": "Choice",
                "Choices": [
                    {"Variable": "$.IsHelloWorldExample", "BooleanEquals": true, "Next": "Wait for 3 seconds"},
                    {"Variable": "$.IsHelloWorldExample", "BooleanEquals": false, "Next": "HelloWorldFailed"}
                ]
            },
            "Wait for 3 seconds": {"Type": "Wait", "Seconds": 3, "Next": "MyParallelState"},
            "MyParallelState": {
                "Type": "Parallel",
                "Branches": [
                    {"StartAt": "Hello", "States": {"Hello": {"Type": "Pass", "End": true}}},
                    {"StartAt": "World", "States": {"World": {"Type": "Pass", "End": true}}}
                ],
                "Next": LAMBDA_ID
            },
            LAMBDA_ID: {
                "Type": "Task",
                "Resource": "arn:aws:states:::lambda:invoke",
                "Parameters": {"FunctionName": "MyLambda", "Payload": {"input": "HelloWorld"}},
                "Next": "HelloWorldSuccessful",
                "Retry": [
                    {"ErrorEquals": ["States.TaskFailed"], "IntervalSeconds": 15, "MaxAttempts": 2, "BackoffRate": 4.0}
                ],
                "Catch": [{"ErrorEquals": ["States.TaskFailed"], "Next": "LambdaTaskFailed"}]
            },
            "HelloWorldSuccessful": {"Type": "Succeed"},
            "LambdaTaskFailed": {"Type": "Fail"},
            "HelloWorldFailed": {"Type": "Fail"}
        }
    });
    let graph = hello_world();
    assert_eq!(
        graph.to_json(false).unwrap(),
        serde_json::to_string(&expected).unwrap()
    );
}

/// **Scenario**: Choice rules keep insertion order; the happy path comes first.
#[test]
fn choice_rules_render_in_insertion_order() {
    let doc = hello_world().to_document();
    let choices = doc["States"][CHOICE_ID]["Choices"].as_array().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0]["Next"], "Wait for 3 seconds");
    assert_eq!(choices[1]["Next"], "HelloWorldFailed");
}

/// **Scenario**: Parallel [Hello, World] renders exactly two single-state terminal branches.
#[test]
fn parallel_branches_in_order() {
    let doc = hello_world().to_document();
    let branches = doc["States"]["MyParallelState"]["Branches"].as_array().unwrap();
    assert_eq!(branches.len(), 2);
    for (branch, id) in branches.iter().zip(["Hello", "World"]) {
        assert_eq!(branch["StartAt"], id);
        assert_eq!(branch["States"].as_object().unwrap().len(), 1);
        assert_eq!(branch["States"][id]["End"], true);
    }
}

/// **Scenario**: Rendering is deterministic across calls and across rebuilt graphs.
#[test]
fn rendering_is_deterministic() {
    let graph = hello_world();
    let first = graph.to_json(true).unwrap();
    assert_eq!(first, graph.to_json(true).unwrap());
    assert_eq!(first, hello_world().to_json(true).unwrap());
}

/// **Scenario**: The tutorial Choice has no default and is reported, not rejected.
#[test]
fn hello_world_warns_about_missing_default() {
    assert_eq!(
        hello_world().warnings(),
        &[ValidationWarning::MissingChoiceDefault(CHOICE_ID.into())]
    );
}

/// **Scenario**: Map renders ItemsPath, MaxConcurrency and the iterator graph.
#[test]
fn map_state_renders_iterator() {
    let iterator = StateGraph::from_chain(
        chain(vec![State::pass("Item"), State::succeed("ItemDone")]).unwrap(),
    )
    .unwrap();
    let map = State::new(
        "Each",
        MapState::new(iterator)
            .with_items_path("$.items")
            .with_max_concurrency(2),
    )
    .with_result_path("$.results");
    let doc = StateGraph::from_chain(map).unwrap().to_document();
    let node = &doc["States"]["Each"];
    let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["Type", "ItemsPath", "MaxConcurrency", "Iterator", "ResultPath", "End"]
    );
    assert_eq!(node["Iterator"]["StartAt"], "Item");
    assert_eq!(node["Iterator"]["States"]["Item"]["Next"], "ItemDone");
}
