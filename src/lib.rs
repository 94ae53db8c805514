//! litegraph - an embedded Cypher query engine over a SQLite property-graph
//! store.
//!
//! Queries are parsed to an AST, classified by clause signature through a
//! table-driven dispatcher, translated to SQL (with recursive CTEs for
//! variable-length paths), executed against SQLite, and reshaped into
//! graph-typed result rows.

pub mod cypher_parser;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod executor;
pub mod params;
pub mod schema;
pub mod transform;
pub mod value;

pub use engine::{Engine, OpenFlags};
pub use error::EngineError;
pub use executor::result::{QueryResult, QueryStats};
pub use executor::AlgorithmRunner;
pub use value::GraphValue;
