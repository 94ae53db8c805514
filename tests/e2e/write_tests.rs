use litegraph::{EngineError, GraphValue};

use super::test_engine;

#[test]
fn set_property_and_label() {
    let engine = test_engine();
    engine.exec("CREATE (:SP {age: 30})").unwrap();

    let result = engine
        .exec("MATCH (n:SP) SET n.age = 31, n:Verified")
        .unwrap();
    // Label adds share the properties_set counter.
    assert_eq!(result.stats.properties_set, 2);

    let check = engine
        .exec("MATCH (n:SP) WHERE n:Verified RETURN n.age")
        .unwrap();
    assert_eq!(check.rows.len(), 1);
    assert_eq!(check.rows[0][0], GraphValue::Integer(31));
}

#[test]
fn set_applies_to_every_matched_row() {
    let engine = test_engine();
    engine.exec("CREATE (:Many {v: 0}), (:Many {v: 0})").unwrap();

    let result = engine.exec("MATCH (m:Many) SET m.v = 1").unwrap();
    assert_eq!(result.stats.properties_set, 2);

    let check = engine
        .exec("MATCH (m:Many) WHERE m.v = 1 RETURN count(*)")
        .unwrap();
    assert_eq!(check.rows[0][0], GraphValue::Integer(2));
}

#[test]
fn set_rejects_computed_values() {
    let engine = test_engine();
    engine.exec("CREATE (:CV {v: 1})").unwrap();
    let err = engine.exec("MATCH (n:CV) SET n.v = n.v").unwrap_err();
    assert!(matches!(err, EngineError::TypeMismatch(_)));
}

#[test]
fn standalone_set_requires_match() {
    let engine = test_engine();
    let err = engine.exec("SET n.v = 1").unwrap_err();
    assert!(matches!(err, EngineError::UnboundVariable(_)));
}

#[test]
fn set_edge_property() {
    let engine = test_engine();
    engine.exec("CREATE (:SE1)-[:R]->(:SE2)").unwrap();

    let result = engine
        .exec("MATCH (a:SE1)-[r:R]->(b:SE2) SET r.weight = 5")
        .unwrap();
    assert_eq!(result.stats.properties_set, 1);
}

#[test]
fn remove_property_and_label() {
    let engine = test_engine();
    engine.exec("CREATE (:RP:Extra {x: 1, y: 2})").unwrap();

    engine.exec("MATCH (n:RP) REMOVE n.x, n:Extra").unwrap();

    let x = engine.exec("MATCH (n:RP) RETURN n.x").unwrap();
    assert_eq!(x.rows[0][0], GraphValue::Null);
    let y = engine.exec("MATCH (n:RP) RETURN n.y").unwrap();
    assert_eq!(y.rows[0][0], GraphValue::Integer(2));

    let extras = engine.exec("MATCH (n:Extra) RETURN count(*)").unwrap();
    assert_eq!(extras.rows[0][0], GraphValue::Integer(0));
}

#[test]
fn foreach_creates_per_element() {
    let engine = test_engine();
    let result = engine
        .exec("FOREACH (name IN ['a', 'b'] | CREATE (:FTag {name: name}))")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 2);
    assert_eq!(result.stats.properties_set, 2);

    let names = engine
        .exec("MATCH (t:FTag) RETURN t.name ORDER BY t.name")
        .unwrap();
    assert_eq!(names.rows.len(), 2);
    assert_eq!(names.rows[0][0], GraphValue::String("a".into()));
}

#[test]
fn nested_foreach_binds_innermost() {
    let engine = test_engine();
    let result = engine
        .exec("FOREACH (x IN [1, 2] | FOREACH (y IN [10] | CREATE (:NF {a: x, b: y})))")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 2);

    let check = engine
        .exec("MATCH (n:NF) RETURN n.a, n.b ORDER BY n.a")
        .unwrap();
    assert_eq!(check.rows[0][0], GraphValue::Integer(1));
    assert_eq!(check.rows[0][1], GraphValue::Integer(10));
    assert_eq!(check.rows[1][0], GraphValue::Integer(2));
}

#[test]
fn unwind_create_iterates_list_literal() {
    let engine = test_engine();
    let result = engine
        .exec("UNWIND [1, 2, 3] AS x CREATE (:UN {v: x})")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 3);
    assert_eq!(result.stats.properties_set, 3);

    let values = engine.exec("MATCH (n:UN) RETURN n.v ORDER BY n.v").unwrap();
    let collected: Vec<GraphValue> = values.rows.iter().map(|row| row[0].clone()).collect();
    assert_eq!(
        collected,
        vec![
            GraphValue::Integer(1),
            GraphValue::Integer(2),
            GraphValue::Integer(3)
        ]
    );
}

#[test]
fn unwind_create_rejects_parameter_lists() {
    let engine = test_engine();
    let err = engine
        .exec_with_params("UNWIND $ids AS x CREATE (:UP {v: x})", r#"{"ids": [1, 2]}"#)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedQuery(_)));

    let count = engine.exec("MATCH (n:UP) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(0));
}

#[test]
fn match_create_binds_matched_nodes() {
    let engine = test_engine();
    engine
        .exec("CREATE (:MC {name: 'a'}), (:MC2 {name: 'b'})")
        .unwrap();

    let result = engine
        .exec("MATCH (a:MC), (b:MC2) CREATE (a)-[:LINK]->(b)")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 0);
    assert_eq!(result.stats.relationships_created, 1);

    let check = engine
        .exec("MATCH (a:MC)-[:LINK]->(b:MC2) RETURN b.name")
        .unwrap();
    assert_eq!(check.rows[0][0], GraphValue::String("b".into()));
}

#[test]
fn property_type_changes_on_reset() {
    let engine = test_engine();
    engine.exec("CREATE (:TC {v: 1})").unwrap();
    engine.exec("MATCH (n:TC) SET n.v = 'text'").unwrap();

    let check = engine.exec("MATCH (n:TC) RETURN n.v").unwrap();
    assert_eq!(check.rows[0][0], GraphValue::String("text".into()));
}

#[test]
fn merge_inside_foreach() {
    let engine = test_engine();
    let result = engine
        .exec("FOREACH (k IN [1, 1, 2] | MERGE (:MF {k: 7}))")
        .unwrap();
    // Same merge target every iteration: created once.
    assert_eq!(result.stats.nodes_created, 1);
}
