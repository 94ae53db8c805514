use std::collections::BTreeMap;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::cypher_parser::ast::{Expression, ReturnClause, ReturnItem};
use crate::error::EngineError;
use crate::params::ParamStore;
use crate::transform::TransformContext;
use crate::value::{Edge, GraphValue, Path, PathSegment, Vertex};

/// Per-query mutation counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
}

impl QueryStats {
    pub fn is_zero(&self) -> bool {
        *self == QueryStats::default()
    }
}

/// The outcome of a successful query: named columns, graph-typed rows, and
/// the mutation counters. The textual rendering is derived from the typed
/// rows, which are the source of truth.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<GraphValue>>,
    pub stats: QueryStats,
}

impl QueryResult {
    pub fn empty() -> Self {
        QueryResult::default()
    }

    pub fn with_stats(stats: QueryStats) -> Self {
        QueryResult {
            stats,
            ..QueryResult::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Text form of every row, derived from the typed values.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }
}

/// Column name for one RETURN item: explicit alias, then property path,
/// identifier, function textualization, and the positional fallback.
pub fn column_name(item: &ReturnItem<'_>, index: usize) -> String {
    if let Some(alias) = item.alias {
        return alias.to_string();
    }
    match &item.expression {
        Expression::Property(prop) => format!("{}.{}", prop.base, prop.key),
        Expression::Identifier(name) => (*name).to_string(),
        Expression::FunctionCall(_) => item.expression.to_string(),
        _ => format!("column_{}", index),
    }
}

/// Execute the prepared SQL and reshape the scalar rows into graph-typed
/// result rows, guided by the RETURN items and the variable context.
pub fn build_query_results(
    conn: &Connection,
    sql: &str,
    params: &ParamStore,
    return_clause: &ReturnClause<'_>,
    tctx: &TransformContext,
) -> Result<QueryResult, EngineError> {
    let mut result = QueryResult::empty();
    for (i, item) in return_clause.items.iter().enumerate() {
        result.columns.push(column_name(item, i));
    }

    let mut stmt = conn.prepare(sql)?;
    params.bind(&mut stmt)?;

    let column_count = return_clause.items.len();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut out = Vec::with_capacity(column_count);
        for (i, item) in return_clause.items.iter().enumerate() {
            let cell = row.get_ref(i)?;
            out.push(cell_value(conn, &item.expression, tctx, cell)?);
        }
        result.rows.push(out);
    }

    Ok(result)
}

fn cell_value(
    conn: &Connection,
    expr: &Expression<'_>,
    tctx: &TransformContext,
    cell: ValueRef<'_>,
) -> Result<GraphValue, EngineError> {
    if matches!(cell, ValueRef::Null) {
        return Ok(GraphValue::Null);
    }

    if let Expression::Identifier(name) = expr {
        if tctx.vars.is_path(name) {
            if let ValueRef::Text(bytes) = cell {
                return path_from_ids(conn, &String::from_utf8_lossy(bytes));
            }
            return Ok(scalar_value(cell));
        }
        if tctx.vars.is_edge(name) {
            return match cell {
                ValueRef::Text(bytes) => edge_from_json(&String::from_utf8_lossy(bytes)),
                ValueRef::Integer(id) => edge_from_id(conn, id),
                _ => Ok(scalar_value(cell)),
            };
        }
        if tctx.vars.lookup_node(name).is_some() {
            return match cell {
                ValueRef::Text(bytes) => {
                    vertex_from_json(conn, &String::from_utf8_lossy(bytes))
                }
                ValueRef::Integer(id) => vertex_from_id(conn, id),
                _ => Ok(scalar_value(cell)),
            };
        }
    }

    Ok(scalar_value(cell))
}

fn scalar_value(cell: ValueRef<'_>) -> GraphValue {
    match cell {
        ValueRef::Null => GraphValue::Null,
        ValueRef::Integer(i) => GraphValue::Integer(i),
        ValueRef::Real(f) => GraphValue::Float(f),
        ValueRef::Text(bytes) => GraphValue::from_sql_text(&String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => GraphValue::String(String::from_utf8_lossy(bytes).to_string()),
    }
}

fn json_to_value(value: &serde_json::Value) -> GraphValue {
    match value {
        serde_json::Value::Null => GraphValue::Null,
        serde_json::Value::Bool(b) => GraphValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                GraphValue::Integer(i)
            } else {
                GraphValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => GraphValue::String(s.clone()),
        other => GraphValue::String(other.to_string()),
    }
}

fn json_properties(value: Option<&serde_json::Value>) -> BTreeMap<String, GraphValue> {
    let mut properties = BTreeMap::new();
    if let Some(serde_json::Value::Object(map)) = value {
        for (key, val) in map {
            properties.insert(key.clone(), json_to_value(val));
        }
    }
    properties
}

/// Parse the `{id, label, properties}` object the SQL projection emits. A
/// null id (an OPTIONAL MATCH miss) collapses to Null.
pub fn vertex_from_json(conn: &Connection, text: &str) -> Result<GraphValue, EngineError> {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Ok(GraphValue::String(text.to_string())),
    };
    let Some(id) = parsed.get("id").and_then(|v| v.as_i64()) else {
        return Ok(GraphValue::Null);
    };

    let label = match parsed.get("label").and_then(|v| v.as_str()) {
        Some(label) => Some(label.to_string()),
        None => node_label(conn, id)?,
    };
    Ok(GraphValue::Vertex(Vertex {
        id,
        label,
        properties: json_properties(parsed.get("properties")),
    }))
}

pub fn edge_from_json(text: &str) -> Result<GraphValue, EngineError> {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Ok(GraphValue::String(text.to_string())),
    };
    let Some(id) = parsed.get("id").and_then(|v| v.as_i64()) else {
        return Ok(GraphValue::Null);
    };
    Ok(GraphValue::Edge(Edge {
        id,
        edge_type: parsed
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        src: parsed.get("src").and_then(|v| v.as_i64()).unwrap_or(0),
        dst: parsed.get("dst").and_then(|v| v.as_i64()).unwrap_or(0),
        properties: json_properties(parsed.get("properties")),
    }))
}

fn node_label(conn: &Connection, node_id: i64) -> Result<Option<String>, EngineError> {
    use rusqlite::OptionalExtension;
    let label = conn
        .query_row(
            "SELECT label FROM node_labels WHERE node_id = ?1 LIMIT 1",
            [node_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(label)
}

/// Rehydrate a vertex from a bare id by consulting the label and typed
/// property tables.
pub fn vertex_from_id(conn: &Connection, node_id: i64) -> Result<GraphValue, EngineError> {
    Ok(GraphValue::Vertex(Vertex {
        id: node_id,
        label: node_label(conn, node_id)?,
        properties: load_properties(conn, node_id, false)?,
    }))
}

pub fn edge_from_id(conn: &Connection, edge_id: i64) -> Result<GraphValue, EngineError> {
    use rusqlite::OptionalExtension;
    let row = conn
        .query_row(
            "SELECT source_id, target_id, type FROM edges WHERE id = ?1",
            [edge_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((src, dst, edge_type)) = row else {
        return Ok(GraphValue::Null);
    };
    Ok(GraphValue::Edge(Edge {
        id: edge_id,
        edge_type,
        src,
        dst,
        properties: load_properties(conn, edge_id, true)?,
    }))
}

/// Load all typed properties of a node or edge into a map.
pub fn load_properties(
    conn: &Connection,
    entity_id: i64,
    is_edge: bool,
) -> Result<BTreeMap<String, GraphValue>, EngineError> {
    let (tables, id_column) = if is_edge {
        (crate::schema::EDGE_PROP_TABLES, "edge_id")
    } else {
        (crate::schema::NODE_PROP_TABLES, "node_id")
    };

    let mut properties = BTreeMap::new();
    for (i, table) in tables.iter().enumerate() {
        let sql = format!(
            "SELECT k.key, p.value FROM {} p JOIN property_keys k ON p.key_id = k.id \
             WHERE p.{} = ?1",
            table, id_column
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([entity_id])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value = match i {
                0 => GraphValue::String(row.get::<_, String>(1)?),
                1 => GraphValue::Integer(row.get::<_, i64>(1)?),
                2 => GraphValue::Float(row.get::<_, f64>(1)?),
                _ => GraphValue::Bool(row.get::<_, i64>(1)? != 0),
            };
            properties.insert(key, value);
        }
    }
    Ok(properties)
}

/// Rebuild a path from its JSON id array. Elements alternate node, edge,
/// node, ... so the position parity decides each element's kind; this holds
/// for variable-length paths whose element count the pattern cannot predict.
pub fn path_from_ids(conn: &Connection, json_ids: &str) -> Result<GraphValue, EngineError> {
    let ids: Vec<i64> = match serde_json::from_str(json_ids) {
        Ok(ids) => ids,
        Err(_) => return Ok(GraphValue::Null),
    };

    let mut elements = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if i % 2 == 0 {
            match vertex_from_id(conn, *id)? {
                GraphValue::Vertex(v) => elements.push(PathSegment::Vertex(v)),
                _ => return Ok(GraphValue::Null),
            }
        } else {
            match edge_from_id(conn, *id)? {
                GraphValue::Edge(e) => elements.push(PathSegment::Edge(e)),
                _ => return Ok(GraphValue::Null),
            }
        }
    }
    Ok(GraphValue::Path(Path { elements }))
}
