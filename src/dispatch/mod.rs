//! Table-driven query pattern dispatch.
//!
//! Queries are classified by which clauses they contain; a static registry
//! maps clause-presence bitmasks to specialized handlers. Of all entries
//! whose required flags are present and whose forbidden flags are absent,
//! the highest-priority one wins; the GENERIC entry guarantees a match for
//! every mask.

use std::fmt;
use std::ops::BitOr;

use crate::cypher_parser::ast::{Clause, Expression, Query};
use crate::error::EngineError;
use crate::executor::result::{QueryResult, QueryStats};
use crate::executor::{self, ExecContext};
use crate::transform::TransformContext;
use crate::value::GraphValue;

/// Clause presence flags; one bit per flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClauseFlags(pub u32);

impl ClauseFlags {
    pub const NONE: ClauseFlags = ClauseFlags(0);
    pub const MATCH: ClauseFlags = ClauseFlags(1 << 0);
    pub const OPTIONAL: ClauseFlags = ClauseFlags(1 << 1);
    pub const MULTI_MATCH: ClauseFlags = ClauseFlags(1 << 2);
    pub const RETURN: ClauseFlags = ClauseFlags(1 << 3);
    pub const CREATE: ClauseFlags = ClauseFlags(1 << 4);
    pub const MERGE: ClauseFlags = ClauseFlags(1 << 5);
    pub const SET: ClauseFlags = ClauseFlags(1 << 6);
    pub const DELETE: ClauseFlags = ClauseFlags(1 << 7);
    pub const REMOVE: ClauseFlags = ClauseFlags(1 << 8);
    pub const WITH: ClauseFlags = ClauseFlags(1 << 9);
    pub const UNWIND: ClauseFlags = ClauseFlags(1 << 10);
    pub const FOREACH: ClauseFlags = ClauseFlags(1 << 11);
    pub const UNION: ClauseFlags = ClauseFlags(1 << 12);
    pub const CALL: ClauseFlags = ClauseFlags(1 << 13);
    pub const LOAD_CSV: ClauseFlags = ClauseFlags(1 << 14);
    pub const EXPLAIN: ClauseFlags = ClauseFlags(1 << 15);

    pub fn contains(self, other: ClauseFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ClauseFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ClauseFlags {
    type Output = ClauseFlags;
    fn bitor(self, rhs: ClauseFlags) -> ClauseFlags {
        ClauseFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for ClauseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "(none)");
        }
        const NAMES: [(ClauseFlags, &str); 16] = [
            (ClauseFlags::MATCH, "MATCH"),
            (ClauseFlags::OPTIONAL, "OPTIONAL"),
            (ClauseFlags::MULTI_MATCH, "MULTI_MATCH"),
            (ClauseFlags::RETURN, "RETURN"),
            (ClauseFlags::CREATE, "CREATE"),
            (ClauseFlags::MERGE, "MERGE"),
            (ClauseFlags::SET, "SET"),
            (ClauseFlags::DELETE, "DELETE"),
            (ClauseFlags::REMOVE, "REMOVE"),
            (ClauseFlags::WITH, "WITH"),
            (ClauseFlags::UNWIND, "UNWIND"),
            (ClauseFlags::FOREACH, "FOREACH"),
            (ClauseFlags::UNION, "UNION"),
            (ClauseFlags::CALL, "CALL"),
            (ClauseFlags::LOAD_CSV, "LOAD_CSV"),
            (ClauseFlags::EXPLAIN, "EXPLAIN"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

pub type PatternHandler =
    fn(&ExecContext<'_>, &Query<'_>, ClauseFlags) -> Result<QueryResult, EngineError>;

/// One entry of the dispatch registry.
pub struct QueryPattern {
    pub name: &'static str,
    pub required: ClauseFlags,
    pub forbidden: ClauseFlags,
    pub handler: PatternHandler,
    pub priority: i32,
}

/// The registry, ordered by priority (highest first). New patterns extend
/// this table; handlers must not re-check what the table already encodes.
pub static PATTERNS: &[QueryPattern] = &[
    QueryPattern {
        name: "UNWIND+CREATE",
        required: ClauseFlags(ClauseFlags::UNWIND.0 | ClauseFlags::CREATE.0),
        forbidden: ClauseFlags(ClauseFlags::RETURN.0 | ClauseFlags::MATCH.0),
        handler: handle_unwind_create,
        priority: 100,
    },
    QueryPattern {
        name: "WITH+MATCH+RETURN",
        required: ClauseFlags(ClauseFlags::WITH.0 | ClauseFlags::MATCH.0 | ClauseFlags::RETURN.0),
        forbidden: ClauseFlags::NONE,
        handler: handle_generic_transform,
        priority: 100,
    },
    QueryPattern {
        name: "MATCH+CREATE+RETURN",
        required: ClauseFlags(
            ClauseFlags::MATCH.0 | ClauseFlags::CREATE.0 | ClauseFlags::RETURN.0,
        ),
        forbidden: ClauseFlags::NONE,
        handler: handle_match_create_return,
        priority: 100,
    },
    QueryPattern {
        name: "MATCH+SET",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::SET.0),
        forbidden: ClauseFlags::NONE,
        handler: handle_match_set,
        priority: 90,
    },
    QueryPattern {
        name: "MATCH+DELETE",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::DELETE.0),
        forbidden: ClauseFlags::NONE,
        handler: handle_match_delete,
        priority: 90,
    },
    QueryPattern {
        name: "MATCH+REMOVE",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::REMOVE.0),
        forbidden: ClauseFlags::NONE,
        handler: handle_match_remove,
        priority: 90,
    },
    QueryPattern {
        name: "MATCH+MERGE",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::MERGE.0),
        forbidden: ClauseFlags::NONE,
        handler: handle_match_merge,
        priority: 90,
    },
    QueryPattern {
        name: "MATCH+CREATE",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::CREATE.0),
        forbidden: ClauseFlags::RETURN,
        handler: handle_match_create,
        priority: 90,
    },
    QueryPattern {
        name: "OPTIONAL_MATCH+RETURN",
        required: ClauseFlags(
            ClauseFlags::MATCH.0 | ClauseFlags::OPTIONAL.0 | ClauseFlags::RETURN.0,
        ),
        forbidden: ClauseFlags(
            ClauseFlags::CREATE.0 | ClauseFlags::SET.0 | ClauseFlags::DELETE.0 | ClauseFlags::MERGE.0,
        ),
        handler: handle_generic_transform,
        priority: 80,
    },
    QueryPattern {
        name: "MULTI_MATCH+RETURN",
        required: ClauseFlags(
            ClauseFlags::MATCH.0 | ClauseFlags::MULTI_MATCH.0 | ClauseFlags::RETURN.0,
        ),
        forbidden: ClauseFlags(
            ClauseFlags::CREATE.0 | ClauseFlags::SET.0 | ClauseFlags::DELETE.0 | ClauseFlags::MERGE.0,
        ),
        handler: handle_generic_transform,
        priority: 80,
    },
    QueryPattern {
        name: "MATCH+RETURN",
        required: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::RETURN.0),
        forbidden: ClauseFlags(
            ClauseFlags::OPTIONAL.0
                | ClauseFlags::MULTI_MATCH.0
                | ClauseFlags::CREATE.0
                | ClauseFlags::SET.0
                | ClauseFlags::DELETE.0
                | ClauseFlags::MERGE.0,
        ),
        handler: handle_match_return,
        priority: 70,
    },
    QueryPattern {
        name: "UNWIND+RETURN",
        required: ClauseFlags(ClauseFlags::UNWIND.0 | ClauseFlags::RETURN.0),
        forbidden: ClauseFlags::CREATE,
        handler: handle_generic_transform,
        priority: 60,
    },
    QueryPattern {
        name: "CREATE",
        required: ClauseFlags::CREATE,
        forbidden: ClauseFlags(ClauseFlags::MATCH.0 | ClauseFlags::UNWIND.0),
        handler: handle_create,
        priority: 50,
    },
    QueryPattern {
        name: "MERGE",
        required: ClauseFlags::MERGE,
        forbidden: ClauseFlags::MATCH,
        handler: handle_merge,
        priority: 50,
    },
    QueryPattern {
        name: "SET",
        required: ClauseFlags::SET,
        forbidden: ClauseFlags::MATCH,
        handler: handle_set,
        priority: 50,
    },
    QueryPattern {
        name: "FOREACH",
        required: ClauseFlags::FOREACH,
        forbidden: ClauseFlags::MATCH,
        handler: handle_foreach,
        priority: 50,
    },
    QueryPattern {
        name: "MATCH",
        required: ClauseFlags::MATCH,
        forbidden: ClauseFlags(
            ClauseFlags::RETURN.0
                | ClauseFlags::CREATE.0
                | ClauseFlags::SET.0
                | ClauseFlags::DELETE.0
                | ClauseFlags::MERGE.0
                | ClauseFlags::REMOVE.0,
        ),
        handler: handle_match_only,
        priority: 40,
    },
    QueryPattern {
        name: "RETURN",
        required: ClauseFlags::RETURN,
        forbidden: ClauseFlags(
            ClauseFlags::MATCH.0 | ClauseFlags::UNWIND.0 | ClauseFlags::WITH.0,
        ),
        handler: handle_return_only,
        priority: 10,
    },
    QueryPattern {
        name: "GENERIC",
        required: ClauseFlags::NONE,
        forbidden: ClauseFlags::NONE,
        handler: handle_generic_transform,
        priority: 0,
    },
];

/// Walk the clause list and build the presence bitmask.
pub fn analyze_query_clauses(query: &Query<'_>) -> ClauseFlags {
    let mut flags = ClauseFlags::NONE;
    let mut match_count = 0;

    if query.explain {
        flags = flags | ClauseFlags::EXPLAIN;
    }

    for clause in &query.clauses {
        match clause {
            Clause::Match(m) => {
                flags = flags | ClauseFlags::MATCH;
                match_count += 1;
                if m.optional {
                    flags = flags | ClauseFlags::OPTIONAL;
                }
            }
            Clause::Return(_) => flags = flags | ClauseFlags::RETURN,
            Clause::Create(_) => flags = flags | ClauseFlags::CREATE,
            Clause::Merge(_) => flags = flags | ClauseFlags::MERGE,
            Clause::Set(_) => flags = flags | ClauseFlags::SET,
            Clause::Delete(_) => flags = flags | ClauseFlags::DELETE,
            Clause::Remove(_) => flags = flags | ClauseFlags::REMOVE,
            Clause::With(_) => flags = flags | ClauseFlags::WITH,
            Clause::Unwind(_) => flags = flags | ClauseFlags::UNWIND,
            Clause::Foreach(_) => flags = flags | ClauseFlags::FOREACH,
            Clause::LoadCsv(_) => flags = flags | ClauseFlags::LOAD_CSV,
        }
    }

    if match_count > 1 {
        flags = flags | ClauseFlags::MULTI_MATCH;
    }
    flags
}

/// Highest-priority entry whose required flags are present and forbidden
/// flags absent. The GENERIC entry makes this total.
pub fn find_matching_pattern(present: ClauseFlags) -> Option<&'static QueryPattern> {
    let mut best: Option<&QueryPattern> = None;
    for pattern in PATTERNS {
        if !present.contains(pattern.required) {
            continue;
        }
        if present.intersects(pattern.forbidden) {
            continue;
        }
        if best.map(|b| pattern.priority > b.priority).unwrap_or(true) {
            best = Some(pattern);
        }
    }
    best
}

/// Analyze, select, and run the handler for a query.
pub fn dispatch_query_pattern(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
) -> Result<QueryResult, EngineError> {
    let flags = analyze_query_clauses(query);
    log::debug!("query clauses: {}", flags);

    let pattern = find_matching_pattern(flags).ok_or_else(|| {
        EngineError::unsupported("no matching execution pattern for query")
    })?;
    log::debug!("matched pattern: {} (priority {})", pattern.name, pattern.priority);

    (pattern.handler)(ctx, query, flags)
}

// ----- handlers -----

/// Shared read pipeline: translate the query and assemble typed results.
fn run_read_query(ctx: &ExecContext<'_>, query: &Query<'_>) -> Result<QueryResult, EngineError> {
    let mut tctx = TransformContext::new();
    let sql = tctx.transform_query(query)?;
    log::debug!("generated SQL: {}", sql);

    match query.find_return() {
        Some(ret) => executor::result::build_query_results(ctx.conn, &sql, ctx.params, ret, &tctx),
        None => collect_untyped_rows(ctx, &sql),
    }
}

/// No RETURN clause: run the SQL and keep the raw column names and scalar
/// cells.
fn collect_untyped_rows(ctx: &ExecContext<'_>, sql: &str) -> Result<QueryResult, EngineError> {
    let mut stmt = ctx.conn.prepare(sql)?;
    ctx.params.bind(&mut stmt)?;

    let mut result = QueryResult::empty();
    result.columns = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let column_count = result.columns.len();

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut out = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let cell = row.get_ref(i)?;
            out.push(match cell {
                rusqlite::types::ValueRef::Null => GraphValue::Null,
                rusqlite::types::ValueRef::Integer(v) => GraphValue::Integer(v),
                rusqlite::types::ValueRef::Real(v) => GraphValue::Float(v),
                rusqlite::types::ValueRef::Text(bytes) => {
                    GraphValue::from_sql_text(&String::from_utf8_lossy(bytes))
                }
                rusqlite::types::ValueRef::Blob(bytes) => {
                    GraphValue::String(String::from_utf8_lossy(bytes).to_string())
                }
            });
        }
        result.rows.push(out);
    }
    Ok(result)
}

fn handle_generic_transform(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    run_read_query(ctx, query)
}

fn handle_match_return(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    run_read_query(ctx, query)
}

fn handle_match_only(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    // Validate and execute the match; a MATCH without RETURN yields no rows.
    let matches = executor::match_clauses_of(query);
    executor::run_match_selector(ctx, &matches)?;
    Ok(QueryResult::empty())
}

fn handle_match_set(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let set = query
        .find_set()
        .ok_or_else(|| EngineError::Internal("SET clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    executor::set::execute_match_set_query(ctx, query, set, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_match_delete(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let delete = query
        .find_delete()
        .ok_or_else(|| EngineError::Internal("DELETE clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    executor::delete::execute_match_delete_query(ctx, query, delete, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_match_remove(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let remove = query
        .find_remove()
        .ok_or_else(|| EngineError::Internal("REMOVE clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    executor::remove::execute_match_remove_query(ctx, query, remove, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_match_merge(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let merge = query
        .find_merge()
        .ok_or_else(|| EngineError::Internal("MERGE clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    executor::merge::execute_match_merge_query(ctx, query, merge, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_match_create(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let create = query
        .find_create()
        .ok_or_else(|| EngineError::Internal("CREATE clause missing".to_string()))?;
    let mut stats = QueryStats::default();

    // Bind variables from the first matched row, then create.
    let matches = executor::match_clauses_of(query);
    let bindings = executor::run_match_selector(ctx, &matches)?;
    let mut var_map = match bindings.rows.first() {
        Some(row) => bindings.var_map_for_row(row),
        None => executor::variable_map::VariableMap::new(),
    };

    executor::create::execute_create_clause(ctx, create, &mut var_map, None, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_match_create_return(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let created = handle_match_create(ctx, query, flags)?;

    // Re-run the reading part so RETURN reflects the post-create graph.
    let read_query = Query {
        clauses: query
            .clauses
            .iter()
            .filter(|clause| matches!(clause, Clause::Match(_) | Clause::Return(_)))
            .cloned()
            .collect(),
        explain: false,
    };
    let mut result = run_read_query(ctx, &read_query)?;
    result.stats = created.stats;
    Ok(result)
}

fn handle_create(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let create = query
        .find_create()
        .ok_or_else(|| EngineError::Internal("CREATE clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    let mut var_map = executor::variable_map::VariableMap::new();
    executor::create::execute_create_clause(ctx, create, &mut var_map, None, &mut stats)?;

    // CREATE ... RETURN resolves returned variables against the new ids.
    if let Some(ret) = query.find_return() {
        let mut result = build_created_return(ctx, ret, &var_map)?;
        result.stats = stats;
        return Ok(result);
    }
    Ok(QueryResult::with_stats(stats))
}

/// RETURN after a bare CREATE: rehydrate directly from the variable map.
fn build_created_return(
    ctx: &ExecContext<'_>,
    ret: &crate::cypher_parser::ast::ReturnClause<'_>,
    var_map: &executor::variable_map::VariableMap,
) -> Result<QueryResult, EngineError> {
    let mut result = QueryResult::empty();
    let mut row = Vec::new();

    for (i, item) in ret.items.iter().enumerate() {
        result
            .columns
            .push(executor::result::column_name(item, i));
        let value = match &item.expression {
            Expression::Identifier(name) => {
                if let Some(node_id) = var_map.node_id(name) {
                    executor::result::vertex_from_id(ctx.conn, node_id)?
                } else if let Some(edge_id) = var_map.edge_id(name) {
                    executor::result::edge_from_id(ctx.conn, edge_id)?
                } else {
                    return Err(EngineError::unbound(*name));
                }
            }
            Expression::Property(prop) => {
                let properties = if let Some(node_id) = var_map.node_id(prop.base) {
                    executor::result::load_properties(ctx.conn, node_id, false)?
                } else if let Some(edge_id) = var_map.edge_id(prop.base) {
                    executor::result::load_properties(ctx.conn, edge_id, true)?
                } else {
                    return Err(EngineError::unbound(prop.base));
                };
                properties
                    .get(prop.key)
                    .cloned()
                    .unwrap_or(GraphValue::Null)
            }
            _ => {
                return Err(EngineError::unsupported(
                    "CREATE ... RETURN supports variables and properties",
                ))
            }
        };
        row.push(value);
    }

    result.rows.push(row);
    Ok(result)
}

fn handle_merge(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let merge = query
        .find_merge()
        .ok_or_else(|| EngineError::Internal("MERGE clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    let mut var_map = executor::variable_map::VariableMap::new();
    executor::merge::execute_merge_clause(ctx, merge, &mut var_map, &mut stats)?;

    if let Some(ret) = query.find_return() {
        let mut result = build_created_return(ctx, ret, &var_map)?;
        result.stats = stats;
        return Ok(result);
    }
    Ok(QueryResult::with_stats(stats))
}

fn handle_set(
    _ctx: &ExecContext<'_>,
    _query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    Err(EngineError::unbound(
        "SET requires a preceding MATCH to bind variables",
    ))
}

fn handle_foreach(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let foreach = query
        .find_foreach()
        .ok_or_else(|| EngineError::Internal("FOREACH clause missing".to_string()))?;
    let mut stats = QueryStats::default();
    let mut var_map = executor::variable_map::VariableMap::new();
    let mut foreach_ctx = executor::foreach::ForeachContext::new();
    executor::execute_foreach_clause(ctx, foreach, &mut var_map, &mut foreach_ctx, &mut stats)?;
    Ok(QueryResult::with_stats(stats))
}

fn handle_unwind_create(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    let unwind = query
        .find_unwind()
        .ok_or_else(|| EngineError::Internal("UNWIND clause missing".to_string()))?;
    let create = query
        .find_create()
        .ok_or_else(|| EngineError::Internal("CREATE clause missing".to_string()))?;

    // Only list literals are supported here; FOREACH keeps the wider
    // list-parameter support.
    if !matches!(unwind.expression, Expression::List(_)) {
        return Err(EngineError::unsupported(
            "UNWIND+CREATE currently only supports list literals",
        ));
    }
    let elements = executor::evaluate_list_expression(&unwind.expression, ctx.params, None)?;

    let mut stats = QueryStats::default();
    let mut foreach_ctx = executor::foreach::ForeachContext::new();
    for element in elements {
        foreach_ctx.push(unwind.alias, element);
        let mut var_map = executor::variable_map::VariableMap::new();
        let outcome = executor::create::execute_create_clause(
            ctx,
            create,
            &mut var_map,
            Some(&foreach_ctx),
            &mut stats,
        );
        foreach_ctx.pop();
        outcome?;
    }
    Ok(QueryResult::with_stats(stats))
}

/// Names recognized as graph algorithms; their execution is delegated to the
/// engine's registered runner.
pub const ALGORITHM_NAMES: [&str; 8] = [
    "pagerank",
    "dijkstra",
    "label_propagation",
    "degree_centrality",
    "betweenness_centrality",
    "closeness_centrality",
    "triangle_count",
    "wcc",
];

fn handle_return_only(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    _flags: ClauseFlags,
) -> Result<QueryResult, EngineError> {
    // Recognize algorithm calls and delegate; the core does not implement
    // any algorithm itself.
    if let Some(ret) = query.find_return() {
        for item in &ret.items {
            if let Expression::FunctionCall(func) = &item.expression {
                let name = func.name.to_lowercase();
                if ALGORITHM_NAMES.contains(&name.as_str()) {
                    let runner = ctx.algorithm.ok_or_else(|| {
                        EngineError::unsupported(format!(
                            "graph algorithm '{}' requires a registered algorithm runner",
                            name
                        ))
                    })?;
                    let mut args = Vec::new();
                    for arg in &func.args {
                        args.push(literal_graph_value(arg)?);
                    }
                    return runner.run(&name, &args);
                }
            }
        }
    }
    run_read_query(ctx, query)
}

fn literal_graph_value(expr: &Expression<'_>) -> Result<GraphValue, EngineError> {
    use crate::cypher_parser::ast::Literal;
    Ok(match expr {
        Expression::Literal(Literal::Integer(i)) => GraphValue::Integer(*i),
        Expression::Literal(Literal::Decimal(d)) => GraphValue::Float(*d),
        Expression::Literal(Literal::String(s)) => GraphValue::String((*s).to_string()),
        Expression::Literal(Literal::Boolean(b)) => GraphValue::Bool(*b),
        Expression::Literal(Literal::Null) => GraphValue::Null,
        _ => {
            return Err(EngineError::unsupported(
                "algorithm arguments must be literals",
            ))
        }
    })
}
