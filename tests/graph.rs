//! Tests for the edge graph model.
mod common;
use serde_json::json;
use tasksmith::prelude::*;

#[test]
fn test_same_pair_edges_collapse_on_export() {
    let mut graph = EdgeGraph::new();
    let imported = graph
        .import(&json!({"edges": [
            {"from": "X", "to": "Y", "connection": {"input": "a", "output": "p"}},
            {"from": "X", "to": "Y", "connection": {"input": "b", "output": "q"}}
        ]}))
        .unwrap();
    assert_eq!(imported, 1);
    assert_eq!(
        graph.to_document(),
        json!({"edges": [
            {"from": "X", "to": "Y", "connection": {"input": "a, b", "output": "p, q"}}
        ]})
    );
}

#[test]
fn test_import_replaces_the_whole_graph() {
    let mut graph = EdgeGraph::from_edges(&[Edge::new("A", "B", "x", "y")]).unwrap();
    graph
        .import(&json!({"task": {"actions": [], "edges": [
            {"from": "instruction", "to": "C", "connection": {"input": "id", "output": "id"}}
        ]}}))
        .unwrap();
    assert_eq!(graph.nodes().collect::<Vec<_>>(), vec!["instruction", "C"]);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge_label("instruction", "C").as_deref(), Some("id->id"));
}

#[test]
fn test_documents_without_edges_are_rejected() {
    let mut graph = EdgeGraph::new();
    assert!(matches!(
        graph.import(&json!({"actions": []})),
        Err(GraphError::InvalidDocument(_))
    ));
    assert!(matches!(
        graph.import(&json!({"edges": [{"from": "A"}]})),
        Err(GraphError::InvalidDocument(_))
    ));
}

#[test]
fn test_nodes_from_selected_operations() {
    let mut session = common::session();
    assert_eq!(
        session.populate_graph_nodes().unwrap_err(),
        GraphError::NoSelectedOperations
    );

    common::add_update_record(&mut session, "r-1", "1");
    session.add_action().unwrap();
    common::add_update_record(&mut session, "r-2", "2");
    let id = session.add_action().unwrap();
    session.select_operation(id, "get_subscription").unwrap();

    session
        .graph_mut()
        .add_edge(&Edge::new("instruction", "update_record", "record_id", "record_id"))
        .unwrap();
    assert_eq!(session.populate_graph_nodes().unwrap(), 2);
    assert_eq!(
        session.graph().nodes().collect::<Vec<_>>(),
        vec!["update_record", "get_subscription"]
    );
    assert_eq!(session.graph().edge_count(), 0);
}

#[test]
fn test_graph_edges_are_exported_with_the_task() {
    let mut session = common::session();
    common::add_update_record(&mut session, "r-1", "1");
    session
        .import_graph(&json!({"edges": [
            {"from": "instruction", "to": "update_record", "connection": {"input": "record_id", "output": "record_id"}},
            {"from": "instruction", "to": "update_record", "connection": {"input": "amount", "output": "amount"}}
        ]}))
        .unwrap();

    let document = session.build_document().unwrap();
    assert_eq!(
        document.edges,
        Some(vec![Edge::new(
            "instruction",
            "update_record",
            "record_id, amount",
            "record_id, amount"
        )])
    );
}
