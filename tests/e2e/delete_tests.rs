use litegraph::{EngineError, GraphValue};

use super::test_engine;

#[test]
fn delete_connected_node_without_detach_fails() {
    let engine = test_engine();
    engine.exec("CREATE (a:X)-[:R]->(b:X)").unwrap();

    let err = engine.exec("MATCH (a:X) DELETE a").unwrap_err();
    assert!(matches!(err, EngineError::ConstraintViolation(_)));

    // Graph unchanged.
    let count = engine.exec("MATCH (a:X) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(2));
}

#[test]
fn detach_delete_removes_nodes_and_edges() {
    let engine = test_engine();
    engine.exec("CREATE (a:X)-[:R]->(b:X)").unwrap();

    let result = engine.exec("MATCH (a:X) DETACH DELETE a").unwrap();
    assert_eq!(result.stats.nodes_deleted, 2);
    assert_eq!(result.stats.relationships_deleted, 1);

    let nodes = engine.exec("MATCH (a:X) RETURN count(*)").unwrap();
    assert_eq!(nodes.rows[0][0], GraphValue::Integer(0));
}

#[test]
fn delete_orphan_node() {
    let engine = test_engine();
    engine.exec("CREATE (:Orphan)").unwrap();

    let result = engine.exec("MATCH (o:Orphan) DELETE o").unwrap();
    assert_eq!(result.stats.nodes_deleted, 1);
    assert_eq!(result.stats.relationships_deleted, 0);
}

#[test]
fn delete_edge_variable() {
    let engine = test_engine();
    engine.exec("CREATE (a:E1)-[:R]->(b:E2)").unwrap();

    let result = engine.exec("MATCH (a:E1)-[r:R]->(b:E2) DELETE r").unwrap();
    assert_eq!(result.stats.relationships_deleted, 1);
    assert_eq!(result.stats.nodes_deleted, 0);

    // Endpoints survive.
    let nodes = engine.exec("MATCH (a:E1) RETURN count(*)").unwrap();
    assert_eq!(nodes.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn delete_cascades_property_rows() {
    let engine = test_engine();
    engine.exec("CREATE (:PC {name: 'x', age: 1})").unwrap();
    engine.exec("MATCH (n:PC) DELETE n").unwrap();

    let orphaned: i64 = engine
        .connection()
        .query_row("SELECT COUNT(*) FROM node_props_text", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned, 0);
    let labels: i64 = engine
        .connection()
        .query_row("SELECT COUNT(*) FROM node_labels", [], |row| row.get(0))
        .unwrap();
    assert_eq!(labels, 0);
}
