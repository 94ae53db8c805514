use litegraph::GraphValue;

use super::test_engine;

#[test]
fn merge_is_idempotent() {
    let engine = test_engine();

    let first = engine.exec("MERGE (p:Person {email: 'x@y'})").unwrap();
    assert_eq!(first.stats.nodes_created, 1);
    assert_eq!(first.stats.properties_set, 1);

    let second = engine.exec("MERGE (p:Person {email: 'x@y'})").unwrap();
    assert_eq!(second.stats.nodes_created, 0);
    assert_eq!(second.stats.properties_set, 0);

    let count = engine.exec("MATCH (p:Person) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(1));
}

#[test]
fn merge_distinguishes_property_values() {
    let engine = test_engine();
    engine.exec("MERGE (p:Person {email: 'a@b'})").unwrap();
    let result = engine.exec("MERGE (p:Person {email: 'c@d'})").unwrap();
    assert_eq!(result.stats.nodes_created, 1);

    let count = engine.exec("MATCH (p:Person) RETURN count(*)").unwrap();
    assert_eq!(count.rows[0][0], GraphValue::Integer(2));
}

#[test]
fn merge_on_create_and_on_match() {
    let engine = test_engine();

    engine
        .exec("MERGE (p:Acct {id: 1}) ON CREATE SET p.state = 'new' ON MATCH SET p.state = 'seen'")
        .unwrap();
    let state = engine.exec("MATCH (p:Acct) RETURN p.state").unwrap();
    assert_eq!(state.rows[0][0], GraphValue::String("new".into()));

    engine
        .exec("MERGE (p:Acct {id: 1}) ON CREATE SET p.state = 'new' ON MATCH SET p.state = 'seen'")
        .unwrap();
    let state = engine.exec("MATCH (p:Acct) RETURN p.state").unwrap();
    assert_eq!(state.rows[0][0], GraphValue::String("seen".into()));
}

#[test]
fn merge_relationship_finds_existing() {
    let engine = test_engine();
    engine
        .exec("CREATE (:MA {n: 1}), (:MB {n: 2})")
        .unwrap();

    let first = engine
        .exec("MATCH (a:MA) MERGE (a)-[:LINKS]->(b:MB {n: 2})")
        .unwrap();
    // b is found, the relationship is created.
    assert_eq!(first.stats.nodes_created, 0);
    assert_eq!(first.stats.relationships_created, 1);

    let second = engine
        .exec("MATCH (a:MA) MERGE (a)-[:LINKS]->(b:MB {n: 2})")
        .unwrap();
    assert_eq!(second.stats.relationships_created, 0);
}

#[test]
fn merge_creates_full_path_when_missing() {
    let engine = test_engine();
    let result = engine
        .exec("MERGE (a:W {k: 1})-[:OWNS]->(b:W {k: 2})")
        .unwrap();
    assert_eq!(result.stats.nodes_created, 2);
    assert_eq!(result.stats.relationships_created, 1);
}
