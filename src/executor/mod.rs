//! Write-clause execution: CREATE, MERGE, SET, DELETE, REMOVE, FOREACH.
//!
//! Every executor follows the same skeleton: run the preceding MATCH as a
//! bound-ids selector, walk the write AST fragment, call the schema facade,
//! and bump the per-query counters.

use rusqlite::Connection;

use crate::cypher_parser::ast::{Clause, Expression, ForeachClause, Literal, MatchClause, Query};
use crate::error::EngineError;
use crate::params::ParamStore;
use crate::schema::PropertyValue;
use crate::transform::variables::VarKind;
use crate::transform::TransformContext;

pub mod create;
pub mod delete;
pub mod foreach;
pub mod merge;
pub mod remove;
pub mod result;
pub mod set;
pub mod variable_map;

use foreach::ForeachContext;
use result::{QueryResult, QueryStats};
use variable_map::{EntityKind, VariableMap};

/// Delegation point for recognized graph-algorithm calls in standalone
/// RETURN clauses. The core only detects the call; it never computes.
pub trait AlgorithmRunner {
    fn run(
        &self,
        name: &str,
        args: &[crate::value::GraphValue],
    ) -> Result<QueryResult, EngineError>;
}

/// Everything an executor needs from the engine for one query.
pub struct ExecContext<'a> {
    pub conn: &'a Connection,
    pub params: &'a ParamStore,
    pub algorithm: Option<&'a dyn AlgorithmRunner>,
}

/// Evaluate a pattern property value: literals, parameters, and the active
/// FOREACH binding (when the value is an identifier). Anything else, and a
/// JSON-null parameter, skips the property.
pub fn evaluate_property_value(
    expr: &Expression<'_>,
    params: &ParamStore,
    foreach: Option<&ForeachContext>,
) -> Result<Option<PropertyValue>, EngineError> {
    match expr {
        Expression::Literal(lit) => Ok(match lit {
            Literal::String(s) => Some(PropertyValue::Text((*s).to_string())),
            Literal::Integer(i) => Some(PropertyValue::Int(*i)),
            Literal::Decimal(d) => Some(PropertyValue::Real(*d)),
            Literal::Boolean(b) => Some(PropertyValue::Bool(*b)),
            Literal::Null => None,
        }),
        Expression::Parameter(name) => params.property_value(name),
        Expression::Identifier(name) => {
            Ok(foreach.and_then(|ctx| ctx.lookup(name)).cloned())
        }
        _ => Ok(None),
    }
}

/// MATCH executed as a bound-ids selector: one column per node/edge
/// variable, one row per match. Optional-match misses surface as None.
pub struct MatchBindings {
    pub vars: Vec<(String, EntityKind)>,
    pub rows: Vec<Vec<Option<i64>>>,
}

impl MatchBindings {
    pub fn column(&self, variable: &str) -> Option<usize> {
        self.vars.iter().position(|(name, _)| name == variable)
    }

    /// Variable map for one row, skipping null bindings.
    pub fn var_map_for_row(&self, row: &[Option<i64>]) -> VariableMap {
        let mut map = VariableMap::new();
        for ((name, kind), id) in self.vars.iter().zip(row.iter()) {
            let Some(id) = id else { continue };
            match kind {
                EntityKind::Node => map.set_node_id(name, *id),
                EntityKind::Edge => map.set_edge_id(name, *id),
            }
        }
        map
    }
}

/// Transform all MATCH clauses of a write query and read back the matched
/// entity ids.
pub fn run_match_selector(
    ctx: &ExecContext<'_>,
    matches: &[&MatchClause<'_>],
) -> Result<MatchBindings, EngineError> {
    let mut tctx = TransformContext::new();
    for clause in matches {
        tctx.transform_match_clause(clause)?;
    }
    let (sql, bound) = tctx.build_bound_ids_sql();
    log::debug!("bound-ids selector SQL: {}", sql);

    let mut stmt = ctx.conn.prepare(&sql)?;
    ctx.params.bind(&mut stmt)?;

    let vars: Vec<(String, EntityKind)> = bound
        .into_iter()
        .map(|(name, kind)| {
            let kind = match kind {
                VarKind::Edge => EntityKind::Edge,
                _ => EntityKind::Node,
            };
            (name, kind)
        })
        .collect();

    let mut rows = Vec::new();
    let mut raw = stmt.raw_query();
    while let Some(row) = raw.next()? {
        let mut ids = Vec::with_capacity(vars.len());
        for i in 0..vars.len() {
            ids.push(row.get::<_, Option<i64>>(i)?);
        }
        rows.push(ids);
    }

    Ok(MatchBindings { vars, rows })
}

/// All MATCH clauses of a query, in textual order.
pub fn match_clauses_of<'q, 'a>(query: &'q Query<'a>) -> Vec<&'q MatchClause<'a>> {
    query
        .clauses
        .iter()
        .filter_map(|clause| match clause {
            Clause::Match(m) => Some(m),
            _ => None,
        })
        .collect()
}

/// FOREACH: evaluate the list, then run the body once per element with the
/// loop variable pushed onto the foreach stack.
pub fn execute_foreach_clause(
    ctx: &ExecContext<'_>,
    clause: &ForeachClause<'_>,
    var_map: &mut VariableMap,
    foreach: &mut ForeachContext,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let elements = evaluate_list_expression(&clause.list, ctx.params, Some(foreach))?;

    for element in elements {
        foreach.push(clause.variable, element);
        let outcome = execute_foreach_body(ctx, &clause.body, var_map, foreach, stats);
        foreach.pop();
        outcome?;
    }
    Ok(())
}

fn execute_foreach_body(
    ctx: &ExecContext<'_>,
    body: &[Clause<'_>],
    var_map: &mut VariableMap,
    foreach: &mut ForeachContext,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    for clause in body {
        match clause {
            Clause::Create(create) => {
                create::execute_create_clause(ctx, create, var_map, Some(foreach), stats)?
            }
            Clause::Merge(m) => merge::execute_merge_clause(ctx, m, var_map, stats)?,
            Clause::Set(s) => set::execute_set_items(ctx, &s.items, var_map, stats)?,
            Clause::Delete(d) => delete::execute_delete_items(ctx, d, var_map, stats)?,
            Clause::Remove(r) => remove::execute_remove_operations(ctx, r, var_map, stats)?,
            Clause::Foreach(nested) => {
                execute_foreach_clause(ctx, nested, var_map, foreach, stats)?
            }
            other => {
                return Err(EngineError::unsupported(format!(
                    "{} is not valid inside FOREACH",
                    clause_name(other)
                )))
            }
        }
    }
    Ok(())
}

fn clause_name(clause: &Clause<'_>) -> &'static str {
    match clause {
        Clause::Match(_) => "MATCH",
        Clause::Return(_) => "RETURN",
        Clause::With(_) => "WITH",
        Clause::Create(_) => "CREATE",
        Clause::Merge(_) => "MERGE",
        Clause::Set(_) => "SET",
        Clause::Delete(_) => "DELETE",
        Clause::Remove(_) => "REMOVE",
        Clause::Unwind(_) => "UNWIND",
        Clause::Foreach(_) => "FOREACH",
        Clause::LoadCsv(_) => "LOAD CSV",
    }
}

/// Evaluate a FOREACH/UNWIND list into concrete property values. List
/// literals and array parameters are supported.
pub fn evaluate_list_expression(
    expr: &Expression<'_>,
    params: &ParamStore,
    foreach: Option<&ForeachContext>,
) -> Result<Vec<PropertyValue>, EngineError> {
    match expr {
        Expression::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if let Some(value) = evaluate_property_value(item, params, foreach)? {
                    out.push(value);
                }
            }
            Ok(out)
        }
        Expression::Parameter(name) => {
            let value = params.get(name).ok_or_else(|| {
                EngineError::InvalidParameter(format!("parameter '{}' not supplied", name))
            })?;
            let serde_json::Value::Array(items) = value else {
                return Err(EngineError::TypeMismatch(format!(
                    "parameter '{}' is not a list",
                    name
                )));
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_json::Value::Bool(b) => out.push(PropertyValue::Bool(*b)),
                    serde_json::Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            out.push(PropertyValue::Int(i));
                        } else {
                            out.push(PropertyValue::Real(n.as_f64().unwrap_or(0.0)));
                        }
                    }
                    serde_json::Value::String(s) => out.push(PropertyValue::Text(s.clone())),
                    serde_json::Value::Null => {}
                    nested => out.push(PropertyValue::Text(nested.to_string())),
                }
            }
            Ok(out)
        }
        _ => Err(EngineError::unsupported(
            "FOREACH/UNWIND currently supports list literals and list parameters",
        )),
    }
}
