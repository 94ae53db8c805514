use litegraph::{EngineError, GraphValue};
use test_case::test_case;

use super::test_engine;

#[test_case(r#"{"v": 1}"#, GraphValue::Integer(1); "integer parameter")]
#[test_case(r#"{"v": 2.5}"#, GraphValue::Float(2.5); "float parameter")]
#[test_case(r#"{"v": "s"}"#, GraphValue::String(String::from("s")); "string parameter")]
#[test_case(r#"{"v": true}"#, GraphValue::Integer(1); "boolean parameter lands in the int-backed table")]
fn parameter_value_round_trips(params: &str, expected: GraphValue) {
    let engine = test_engine();
    engine
        .exec_with_params("CREATE (:PT {v: $v})", params)
        .unwrap();
    let result = engine.exec("MATCH (p:PT) RETURN p.v").unwrap();
    assert_eq!(result.rows[0][0], expected);
}

#[test]
fn parameterized_match() {
    let engine = test_engine();
    engine
        .exec("CREATE (:P {name: 'A'}), (:P {name: 'B'})")
        .unwrap();

    let result = engine
        .exec_with_params("MATCH (p:P {name: $n}) RETURN p.name", r#"{"n": "A"}"#)
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::String("A".into()));
}

#[test]
fn parameterized_where_clause() {
    let engine = test_engine();
    engine
        .exec("CREATE (:Q {age: 20}), (:Q {age: 40})")
        .unwrap();

    let result = engine
        .exec_with_params("MATCH (q:Q) WHERE q.age > $min RETURN q.age", r#"{"min": 30}"#)
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], GraphValue::Integer(40));
}

#[test]
fn unused_parameter_is_silently_ignored() {
    let engine = test_engine();
    engine.exec("CREATE (:P {name: 'A'})").unwrap();

    let with_extra = engine
        .exec_with_params(
            "MATCH (p:P {name: $n}) RETURN p.name",
            r#"{"n": "A", "unused": 123}"#,
        )
        .unwrap();
    let without = engine
        .exec_with_params("MATCH (p:P {name: $n}) RETURN p.name", r#"{"n": "A"}"#)
        .unwrap();
    assert_eq!(with_extra.rows, without.rows);
}

#[test]
fn malformed_parameter_json_is_rejected() {
    let engine = test_engine();
    let err = engine
        .exec_with_params("MATCH (n) RETURN n", "{broken json")
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParameter(_)));
}

#[test]
fn set_property_from_parameter() {
    let engine = test_engine();
    engine.exec("CREATE (:U {name: 'u'})").unwrap();

    let result = engine
        .exec_with_params(
            "MATCH (u:U) SET u.email = $email",
            r#"{"email": "u@example.com"}"#,
        )
        .unwrap();
    assert_eq!(result.stats.properties_set, 1);

    let check = engine.exec("MATCH (u:U) RETURN u.email").unwrap();
    assert_eq!(check.rows[0][0], GraphValue::String("u@example.com".into()));
}

#[test]
fn list_parameter_unwinds() {
    let engine = test_engine();
    let result = engine
        .exec_with_params("UNWIND $items AS item RETURN item", r#"{"items": [10, 20]}"#)
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0][0], GraphValue::Integer(10));
}

#[test]
fn missing_parameter_in_set_fails() {
    let engine = test_engine();
    engine.exec("CREATE (:MPF {n: 1})").unwrap();
    let err = engine
        .exec_with_params("MATCH (m:MPF) SET m.v = $absent", r#"{}"#)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParameter(_)));
}
