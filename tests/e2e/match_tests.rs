use litegraph::{EngineError, GraphValue};

use super::test_engine;

#[test]
fn match_with_where_comparison() {
    let engine = test_engine();
    engine
        .exec("CREATE (:Person {name: 'Alice', age: 30}), (:Person {name: 'Bob', age: 17})")
        .unwrap();

    let result = engine
        .exec("MATCH (p:Person) WHERE p.age > 18 RETURN p.name")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::String("Alice".into()));
}

#[test]
fn match_relationship_direction() {
    let engine = test_engine();
    engine
        .exec("CREATE (:A {name: 'a'})-[:R]->(:B {name: 'b'})")
        .unwrap();

    let forward = engine.exec("MATCH (x:A)-[:R]->(y:B) RETURN y.name").unwrap();
    assert_eq!(forward.rows.len(), 1);

    let wrong_direction = engine.exec("MATCH (x:A)<-[:R]-(y:B) RETURN y.name").unwrap();
    assert_eq!(wrong_direction.rows.len(), 0);

    // Undirected reads match either orientation.
    let either = engine.exec("MATCH (x:A)-[:R]-(y:B) RETURN y.name").unwrap();
    assert_eq!(either.rows.len(), 1);
}

#[test]
fn match_string_predicates() {
    let engine = test_engine();
    engine
        .exec("CREATE (:S {v: 'Alpha'}), (:S {v: 'Beta'}), (:S {v: 'Alphabet'})")
        .unwrap();

    let starts = engine
        .exec("MATCH (s:S) WHERE s.v STARTS WITH 'Alpha' RETURN s.v")
        .unwrap();
    assert_eq!(starts.rows.len(), 2);

    let contains = engine
        .exec("MATCH (s:S) WHERE s.v CONTAINS 'et' RETURN s.v")
        .unwrap();
    assert_eq!(contains.rows.len(), 1);
    assert_eq!(contains.rows[0][0], GraphValue::String("Alphabet".into()));

    let ends = engine
        .exec("MATCH (s:S) WHERE s.v ENDS WITH 'a' RETURN s.v")
        .unwrap();
    assert_eq!(ends.rows.len(), 2);
}

#[test]
fn match_order_skip_limit() {
    let engine = test_engine();
    engine
        .exec("CREATE (:N {v: 3}), (:N {v: 1}), (:N {v: 2})")
        .unwrap();

    let result = engine
        .exec("MATCH (n:N) RETURN n.v ORDER BY n.v ASC SKIP 1 LIMIT 1")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::Integer(2));
}

#[test]
fn variable_length_path_bounds() {
    let engine = test_engine();
    engine
        .exec(
            "CREATE (:C {name: 'a'})-[:R]->(:C {name: 'b'})-[:R]->(:C {name: 'c'})-[:R]->(:C {name: 'd'})",
        )
        .unwrap();

    let result = engine
        .exec("MATCH p = (a)-[:R*2..3]->(z) RETURN length(p)")
        .unwrap();

    let mut depths: Vec<i64> = result
        .rows
        .iter()
        .map(|row| match row[0] {
            GraphValue::Integer(d) => d,
            ref other => panic!("expected integer depth, got {:?}", other),
        })
        .collect();
    depths.sort_unstable();
    assert_eq!(depths, vec![2, 2, 3]);
}

#[test]
fn path_variable_rehydrates_elements() {
    let engine = test_engine();
    engine
        .exec("CREATE (:PV {name: 'x'})-[:STEP]->(:PV {name: 'y'})")
        .unwrap();

    let result = engine
        .exec("MATCH p = (a:PV {name: 'x'})-[:STEP]->(b) RETURN p")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    match &result.rows[0][0] {
        GraphValue::Path(path) => {
            assert_eq!(path.elements.len(), 3);
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn optional_match_misses_are_null() {
    let engine = test_engine();
    engine
        .exec("CREATE (:OM {name: 'has'})-[:L]->(:Target), (:OM {name: 'none'})")
        .unwrap();

    let result = engine
        .exec("MATCH (p:OM) OPTIONAL MATCH (p)-[:L]->(q:Target) RETURN p.name, q ORDER BY p.name")
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    // 'has' row carries a vertex, 'none' row a null.
    assert!(matches!(result.rows[0][1], GraphValue::Vertex(_)));
    assert_eq!(result.rows[1][1], GraphValue::Null);
}

#[test]
fn with_projection_hides_other_variables() {
    let engine = test_engine();
    engine.exec("CREATE (:SC {name: 'v'})").unwrap();

    let ok = engine
        .exec("MATCH (p:SC) WITH p.name AS name RETURN name")
        .unwrap();
    assert_eq!(ok.rows[0][0], GraphValue::String("v".into()));

    let err = engine
        .exec("MATCH (p:SC) WITH p.name AS name RETURN p")
        .unwrap_err();
    assert!(matches!(err, EngineError::UnboundVariable(_)));
}

#[test]
fn with_aggregation_and_having() {
    let engine = test_engine();
    engine
        .exec(
            "CREATE (a:AG {name: 'popular'})-[:F]->(:T), (a)-[:F]->(:T), \
             (:AG {name: 'quiet'})-[:F]->(:T)",
        )
        .unwrap();

    let result = engine
        .exec("MATCH (a:AG)-[:F]->(t) WITH a, count(*) AS c WHERE c > 1 RETURN a.name, c")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::String("popular".into()));
    assert_eq!(result.rows[0][1], GraphValue::Integer(2));
}

#[test]
fn aggregate_in_return_groups_rows() {
    let engine = test_engine();
    engine
        .exec("CREATE (:G {city: 'x'}), (:G {city: 'x'}), (:G {city: 'y'})")
        .unwrap();

    let result = engine
        .exec("MATCH (g:G) RETURN g.city, count(*) ORDER BY g.city")
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0][1], GraphValue::Integer(2));
    assert_eq!(result.rows[1][1], GraphValue::Integer(1));
}

#[test]
fn unwind_returns_elements() {
    let engine = test_engine();
    let result = engine.exec("UNWIND [1, 2, 3] AS x RETURN x").unwrap();
    let values: Vec<GraphValue> = result.rows.iter().map(|row| row[0].clone()).collect();
    assert_eq!(
        values,
        vec![
            GraphValue::Integer(1),
            GraphValue::Integer(2),
            GraphValue::Integer(3)
        ]
    );
}

#[test]
fn distinct_deduplicates() {
    let engine = test_engine();
    engine
        .exec("CREATE (:D {c: 'a'}), (:D {c: 'a'}), (:D {c: 'b'})")
        .unwrap();
    let result = engine.exec("MATCH (d:D) RETURN DISTINCT d.c").unwrap();
    assert_eq!(result.rows.len(), 2);
}

#[test]
fn standalone_return_evaluates_expression() {
    let engine = test_engine();
    let result = engine.exec("RETURN 1 + 2 AS sum").unwrap();
    assert_eq!(result.columns, vec!["sum"]);
    assert_eq!(result.rows[0][0], GraphValue::Integer(3));
}

#[test]
fn label_predicate_in_where() {
    let engine = test_engine();
    engine.exec("CREATE (:LW:Admin {n: 1}), (:LW {n: 2})").unwrap();
    let result = engine
        .exec("MATCH (x:LW) WHERE x:Admin RETURN x.n")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn reverse_function_is_available_in_queries() {
    let engine = test_engine();
    engine.exec("CREATE (:RV {s: 'abc'})").unwrap();
    let result = engine.exec("MATCH (r:RV) RETURN reverse(r.s)").unwrap();
    assert_eq!(result.rows[0][0], GraphValue::String("cba".into()));
}

#[test]
fn in_list_predicate() {
    let engine = test_engine();
    engine
        .exec("CREATE (:IL {name: 'Alice'}), (:IL {name: 'Carol'})")
        .unwrap();
    let result = engine
        .exec("MATCH (p:IL) WHERE p.name IN ['Alice', 'Bob'] RETURN p.name")
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::String("Alice".into()));
}
