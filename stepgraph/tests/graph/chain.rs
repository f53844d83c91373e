//! Chaining: default transitions, End closing, linking rules.

use stepgraph::{chain, GraphError, State, StateGraph, Transition};

/// **Scenario**: Chaining [A, B, C] of Pass states yields A→B, B→C, C End.
#[test]
fn chain_links_in_order_and_closes_last() {
    let graph = StateGraph::from_chain(
        chain(vec![State::pass("A"), State::pass("B"), State::pass("C")]).unwrap(),
    )
    .unwrap();
    let doc = graph.to_document();
    assert_eq!(doc["StartAt"], "A");
    assert_eq!(doc["States"]["A"]["Next"], "B");
    assert_eq!(doc["States"]["B"]["Next"], "C");
    assert_eq!(doc["States"]["C"]["End"], true);
    assert!(doc["States"]["C"].get("Next").is_none());
}

/// **Scenario**: A state with an explicit next cannot be chained again.
#[test]
fn chain_rejects_explicit_next() {
    let a = State::pass("A").with_next("Elsewhere").unwrap();
    let err = chain(vec![a, State::pass("B")]).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

/// **Scenario**: Nothing can follow a terminal state in a chain.
#[test]
fn chain_rejects_link_from_terminal() {
    let err = chain(vec![State::succeed("Done"), State::pass("After")]).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
    let err = chain(vec![State::fail("Boom"), State::pass("After")]).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

/// **Scenario**: Duplicate ids inside one chain are rejected.
#[test]
fn chain_rejects_duplicate_ids() {
    let err = chain(vec![State::pass("A"), State::pass("A")]).unwrap_err();
    assert_eq!(err, GraphError::DuplicateId("A".into()));
}

/// **Scenario**: `then` appends a chain with the same linking rules.
#[test]
fn then_appends() {
    let c = chain(vec![State::pass("A")])
        .unwrap()
        .then(chain(vec![State::pass("B"), State::succeed("C")]).unwrap())
        .unwrap();
    assert_eq!(c.len(), 3);
    let graph = StateGraph::from_chain(c).unwrap();
    assert_eq!(
        graph.state("A").unwrap().transition(),
        &Transition::Next("B".into())
    );
}

/// **Scenario**: A reference by id builds a loop back to an earlier state.
#[test]
fn reference_by_id_builds_loop() {
    let mut check = stepgraph::State::choice("Check");
    check
        .add_choice(
            stepgraph::ChoiceRule::numeric_greater_than("$.count", 3),
            State::succeed("Done"),
        )
        .unwrap()
        .set_default("Work")
        .unwrap();
    let graph = StateGraph::from_chain(
        chain(vec![State::pass("Work"), check]).unwrap(),
    )
    .unwrap();
    assert!(graph.warnings().is_empty());
    assert_eq!(graph.to_document()["States"]["Check"]["Default"], "Work");
}
