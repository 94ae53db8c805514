use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The graph-typed result value. The typed form is the source of truth; the
/// textual form shown by the CLI is derived through `Display`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Vertex(Vertex),
    Edge(Edge),
    Path(Path),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    pub id: i64,
    pub label: Option<String>,
    pub properties: BTreeMap<String, GraphValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: i64,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub src: i64,
    pub dst: i64,
    pub properties: BTreeMap<String, GraphValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub elements: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Vertex(Vertex),
    Edge(Edge),
}

impl GraphValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GraphValue::Null)
    }

    /// Detect the scalar type of a textual SQL cell: boolean words, integer,
    /// float, else string.
    pub fn from_sql_text(text: &str) -> GraphValue {
        match text {
            "true" => return GraphValue::Bool(true),
            "false" => return GraphValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = text.parse::<i64>() {
            return GraphValue::Integer(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return GraphValue::Float(f);
        }
        GraphValue::String(text.to_string())
    }
}

fn write_properties(
    f: &mut fmt::Formatter<'_>,
    properties: &BTreeMap<String, GraphValue>,
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", key, value)?;
    }
    write!(f, "}}")
}

impl fmt::Display for GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphValue::Null => write!(f, "null"),
            GraphValue::Bool(b) => write!(f, "{}", b),
            GraphValue::Integer(i) => write!(f, "{}", i),
            GraphValue::Float(x) => write!(f, "{}", x),
            GraphValue::String(s) => write!(f, "{}", s),
            GraphValue::Vertex(v) => write!(f, "{}", v),
            GraphValue::Edge(e) => write!(f, "{}", e),
            GraphValue::Path(p) => write!(f, "{}", p),
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(:{} id={} ", self.label.as_deref().unwrap_or("?"), self.id)?;
        write_properties(f, &self.properties)?;
        write!(f, ")")
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[:{} id={} {}->{} ",
            self.edge_type, self.id, self.src, self.dst
        )?;
        write_properties(f, &self.properties)?;
        write!(f, "]")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.elements {
            match segment {
                PathSegment::Vertex(v) => write!(f, "{}", v)?,
                PathSegment::Edge(e) => write!(f, "{}", e)?,
            }
        }
        Ok(())
    }
}
