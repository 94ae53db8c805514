use litegraph::{Engine, GraphValue, OpenFlags};

use super::test_engine;

#[test]
fn create_and_return_properties() {
    let engine = test_engine();
    let result = engine
        .exec("CREATE (a:Person {name: 'Alice', age: 30}) RETURN a.name, a.age")
        .unwrap();

    assert_eq!(result.columns, vec!["a.name", "a.age"]);
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::String("Alice".into()));
    assert_eq!(result.rows[0][1], GraphValue::Integer(30));
    assert_eq!(result.stats.nodes_created, 1);
    assert_eq!(result.stats.properties_set, 2);
}

#[test]
fn create_returns_vertex_with_creation_id() {
    let engine = test_engine();
    let created = engine.exec("CREATE (v:Thing) RETURN v").unwrap();
    let GraphValue::Vertex(created_vertex) = &created.rows[0][0] else {
        panic!("expected a vertex, got {:?}", created.rows[0][0]);
    };

    // The id of the freshly created vertex round-trips through MATCH.
    let matched = engine.exec("MATCH (v:Thing) RETURN v").unwrap();
    let GraphValue::Vertex(matched_vertex) = &matched.rows[0][0] else {
        panic!("expected a vertex, got {:?}", matched.rows[0][0]);
    };
    assert_eq!(created_vertex.id, matched_vertex.id);
    assert_eq!(matched_vertex.label.as_deref(), Some("Thing"));
}

#[test]
fn create_relationship_with_default_type() {
    let engine = test_engine();
    let result = engine.exec("CREATE (a)-[]->(b)").unwrap();
    assert_eq!(result.stats.nodes_created, 2);
    assert_eq!(result.stats.relationships_created, 1);

    let types = engine.exec("MATCH (a)-[r]->(b) RETURN type(r)").unwrap();
    assert_eq!(types.rows[0][0], GraphValue::String("RELATED".into()));
}

#[test]
fn create_left_arrow_swaps_endpoints() {
    let engine = test_engine();
    engine
        .exec("CREATE (a:Src {name: 'a'})<-[:POINTS]-(b:Dst {name: 'b'})")
        .unwrap();

    // b is the relationship source after the swap.
    let result = engine
        .exec("MATCH (x)-[:POINTS]->(y) RETURN x.name, y.name")
        .unwrap();
    assert_eq!(result.rows[0][0], GraphValue::String("b".into()));
    assert_eq!(result.rows[0][1], GraphValue::String("a".into()));
}

#[test]
fn create_multiple_patterns_share_variables() {
    let engine = test_engine();
    let result = engine
        .exec("CREATE (a:P {name: 'A'}), (a)-[:KNOWS]->(b:P {name: 'B'})")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 2);
    assert_eq!(result.stats.relationships_created, 1);
}

#[test]
fn create_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");

    {
        let engine = Engine::open(&path, OpenFlags::read_write_create()).unwrap();
        engine.exec("CREATE (:Persisted {n: 1})").unwrap();
    }

    let engine = Engine::open(&path, OpenFlags::read_write_create()).unwrap();
    let result = engine.exec("MATCH (p:Persisted) RETURN p.n").unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::Integer(1));
}
