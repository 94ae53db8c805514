use litegraph::GraphValue;

use super::test_engine;

#[test]
fn explain_reports_pattern_clauses_and_sql() {
    let engine = test_engine();
    engine.exec("CREATE (:EX {n: 1})").unwrap();

    let result = engine.exec("EXPLAIN MATCH (n) RETURN n").unwrap();
    assert_eq!(result.rows.len(), 1);

    let GraphValue::String(text) = &result.rows[0][0] else {
        panic!("expected text output, got {:?}", result.rows[0][0]);
    };
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Pattern: MATCH+RETURN");
    assert!(lines[1].starts_with("Clauses: "));
    assert!(lines[1].contains("MATCH"));
    assert!(lines[1].contains("RETURN"));
    assert!(lines[2].starts_with("SQL: "));

    // EXPLAIN must not execute anything.
    let count = engine.exec("MATCH (e:EX) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn explain_of_write_query_does_not_mutate() {
    let engine = test_engine();
    let result = engine.exec("EXPLAIN CREATE (:EW {n: 1})").unwrap();
    assert_eq!(result.rows.len(), 1);

    let count = engine.exec("MATCH (e:EW) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(0));
}

#[test]
fn union_combines_and_deduplicates() {
    let engine = test_engine();
    engine
        .exec("CREATE (:UA {name: 'x'}), (:UB {name: 'y'}), (:UB {name: 'x'})")
        .unwrap();

    let distinct = engine
        .exec("MATCH (a:UA) RETURN a.name UNION MATCH (b:UB) RETURN b.name")
        .unwrap();
    // 'x' appears in both arms but UNION deduplicates.
    assert_eq!(distinct.rows.len(), 2);

    let all = engine
        .exec("MATCH (a:UA) RETURN a.name UNION ALL MATCH (b:UB) RETURN b.name")
        .unwrap();
    assert_eq!(all.rows.len(), 3);
}

#[test]
fn transactions_roll_back_queries() {
    let engine = test_engine();
    engine.begin().unwrap();
    engine.exec("CREATE (:TX {n: 1})").unwrap();
    engine.rollback().unwrap();

    let count = engine.exec("MATCH (t:TX) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(0));

    engine.begin().unwrap();
    engine.exec("CREATE (:TX {n: 1})").unwrap();
    engine.commit().unwrap();
    let count = engine.exec("MATCH (t:TX) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn comments_are_stripped() {
    let engine = test_engine();
    let result = engine
        .exec("// leading comment\nRETURN 1 AS v -- trailing comment")
        .unwrap();
    assert_eq!(result.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn parse_errors_carry_location() {
    let engine = test_engine();
    let err = engine.exec("MATCH (n) RETURN n ???").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 1"), "message: {}", message);
}

#[test]
fn load_csv_is_parsed_but_unsupported() {
    let engine = test_engine();
    let err = engine
        .exec("LOAD CSV WITH HEADERS FROM 'people.csv' AS row RETURN row")
        .unwrap_err();
    assert!(matches!(err, litegraph::EngineError::UnsupportedQuery(_)));
}

#[test]
fn algorithm_calls_require_a_runner() {
    let engine = test_engine();
    let err = engine.exec("RETURN pagerank(0.85, 20)").unwrap_err();
    assert!(matches!(err, litegraph::EngineError::UnsupportedQuery(_)));
}
