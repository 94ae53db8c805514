use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::cypher_parser::{self, ast::Statement};
use crate::dispatch::{analyze_query_clauses, dispatch_query_pattern, find_matching_pattern};
use crate::error::EngineError;
use crate::executor::result::{QueryResult, QueryStats};
use crate::executor::{AlgorithmRunner, ExecContext};
use crate::params::ParamStore;
use crate::schema::{PropertyValue, SchemaFacade, SqliteSchema};
use crate::transform::TransformContext;
use crate::value::GraphValue;

/// Database open flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(u8);

impl OpenFlags {
    pub const READ_ONLY: OpenFlags = OpenFlags(1);
    pub const READ_WRITE: OpenFlags = OpenFlags(2);
    pub const CREATE: OpenFlags = OpenFlags(4);

    pub fn read_write_create() -> OpenFlags {
        OpenFlags(Self::READ_WRITE.0 | Self::CREATE.0)
    }

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for OpenFlags {
    type Output = OpenFlags;
    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

/// The query engine: one SQLite connection, single-threaded synchronous
/// execution. Multiple engines may coexist in a process; nothing is shared
/// between them.
pub struct Engine {
    conn: Connection,
    algorithm: Option<Box<dyn AlgorithmRunner>>,
}

impl Engine {
    /// Open (or create) a graph database file.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Engine, EngineError> {
        let mut sqlite_flags = rusqlite::OpenFlags::empty();
        if flags.contains(OpenFlags::READ_ONLY) {
            sqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            sqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE;
        }
        if flags.contains(OpenFlags::CREATE) {
            sqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(path, sqlite_flags)?;
        Self::from_connection(conn, !flags.contains(OpenFlags::READ_ONLY))
    }

    /// In-memory engine, mainly for tests and scratch use.
    pub fn open_in_memory() -> Result<Engine, EngineError> {
        Self::from_connection(Connection::open_in_memory()?, true)
    }

    fn from_connection(conn: Connection, initialize: bool) -> Result<Engine, EngineError> {
        register_custom_functions(&conn)?;
        if initialize {
            SqliteSchema::initialize(&conn)?;
        }
        log::debug!("engine ready (schema initialized: {})", initialize);
        Ok(Engine {
            conn,
            algorithm: None,
        })
    }

    /// Install a runner for recognized graph-algorithm calls.
    pub fn set_algorithm_runner(&mut self, runner: Box<dyn AlgorithmRunner>) {
        self.algorithm = Some(runner);
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute a Cypher query.
    pub fn exec(&self, query: &str) -> Result<QueryResult, EngineError> {
        self.exec_with_store(query, ParamStore::default())
    }

    /// Execute a Cypher query with a JSON parameter object.
    pub fn exec_with_params(
        &self,
        query: &str,
        params_json: &str,
    ) -> Result<QueryResult, EngineError> {
        let store = ParamStore::from_json(params_json)?;
        self.exec_with_store(query, store)
    }

    fn exec_with_store(&self, query: &str, params: ParamStore) -> Result<QueryResult, EngineError> {
        let cleaned = cypher_parser::strip_comments(query);
        let statement = cypher_parser::parse(&cleaned)?;

        if statement.query.explain {
            return self.explain(&statement);
        }

        let ctx = ExecContext {
            conn: &self.conn,
            params: &params,
            algorithm: self.algorithm.as_deref(),
        };

        if statement.unions.is_empty() {
            dispatch_query_pattern(&ctx, &statement.query)
        } else {
            self.exec_union(&ctx, &statement)
        }
    }

    /// EXPLAIN: report the matched pattern, the clause flags, and the
    /// would-be SQL without touching the graph.
    fn explain(&self, statement: &Statement<'_>) -> Result<QueryResult, EngineError> {
        let query = &statement.query;
        let flags = analyze_query_clauses(query);
        let pattern_name = find_matching_pattern(flags)
            .map(|p| p.name)
            .unwrap_or("NONE");

        // Reading queries show their full SELECT; write queries show the
        // bound-ids selector their executor would run.
        let sql = if query.find_return().is_some() {
            let mut tctx = TransformContext::new();
            tctx.transform_query(query)?
        } else {
            let mut tctx = TransformContext::new();
            for clause in crate::executor::match_clauses_of(query) {
                tctx.transform_match_clause(clause)?;
            }
            tctx.build_bound_ids_sql().0
        };

        let mut result = QueryResult::empty();
        result.columns.push("explain".to_string());
        // Exactly three lines; the SQL is flattened onto one.
        result.rows.push(vec![GraphValue::String(format!(
            "Pattern: {}\nClauses: {}\nSQL: {}",
            pattern_name,
            flags,
            sql.replace('\n', " ")
        ))]);
        Ok(result)
    }

    /// UNION: transform each arm independently and concatenate. Arm order is
    /// preserved; bare UNION deduplicates in the backend.
    fn exec_union(
        &self,
        ctx: &ExecContext<'_>,
        statement: &Statement<'_>,
    ) -> Result<QueryResult, EngineError> {
        let mut first_ctx = TransformContext::new();
        let mut sql = first_ctx.transform_query(&statement.query)?;
        if first_ctx.has_ctes() {
            return Err(EngineError::unsupported(
                "variable-length paths cannot be combined with UNION",
            ));
        }

        for arm in &statement.unions {
            let mut arm_ctx = TransformContext::new();
            let arm_sql = arm_ctx.transform_query(&arm.query)?;
            if arm_ctx.has_ctes() {
                return Err(EngineError::unsupported(
                    "variable-length paths cannot be combined with UNION",
                ));
            }
            sql.push_str(if arm.all { "\nUNION ALL\n" } else { "\nUNION\n" });
            sql.push_str(&arm_sql);
        }
        log::debug!("generated UNION SQL: {}", sql);

        let ret = statement.query.find_return().ok_or_else(|| {
            EngineError::unsupported("UNION arms must end in RETURN")
        })?;
        crate::executor::result::build_query_results(ctx.conn, &sql, ctx.params, ret, &first_ctx)
    }

    // ----- transactions -----

    pub fn begin(&self) -> Result<(), EngineError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<(), EngineError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<(), EngineError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ----- programmatic property-graph API -----

    pub fn node_create(&self, labels: &[&str]) -> Result<i64, EngineError> {
        let schema = SqliteSchema::new(&self.conn);
        let node_id = schema.create_node()?;
        for label in labels {
            schema.add_node_label(node_id, label)?;
        }
        Ok(node_id)
    }

    pub fn node_set_property(
        &self,
        node_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError> {
        SqliteSchema::new(&self.conn).set_node_property(node_id, key, value)
    }

    pub fn edge_create(
        &self,
        source_id: i64,
        target_id: i64,
        edge_type: &str,
    ) -> Result<i64, EngineError> {
        SqliteSchema::new(&self.conn).create_edge(source_id, target_id, edge_type)
    }

    pub fn edge_set_property(
        &self,
        edge_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError> {
        SqliteSchema::new(&self.conn).set_edge_property(edge_id, key, value)
    }
}

/// Print-style summary used by the CLI: mutation counters when nonzero.
pub fn format_stats(stats: &QueryStats) -> Option<String> {
    if stats.is_zero() {
        return None;
    }
    Some(format!(
        "nodes created: {}, relationships created: {}, properties set: {}, \
         nodes deleted: {}, relationships deleted: {}",
        stats.nodes_created,
        stats.relationships_created,
        stats.properties_set,
        stats.nodes_deleted,
        stats.relationships_deleted,
    ))
}

/// Custom scalar functions available to generated SQL. REVERSE reverses its
/// argument bytewise and passes NULL through.
fn register_custom_functions(conn: &Connection) -> Result<(), EngineError> {
    conn.create_scalar_function(
        "REVERSE",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| {
                let mut bytes = text.into_bytes();
                bytes.reverse();
                String::from_utf8(bytes)
                    .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
            }))
        },
    )?;
    Ok(())
}
