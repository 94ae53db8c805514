use crate::cypher_parser::ast::{Query, RemoveClause, RemoveItem};
use crate::error::EngineError;
use crate::schema::{SchemaFacade, SqliteSchema};

use super::result::QueryStats;
use super::variable_map::VariableMap;
use super::{match_clauses_of, run_match_selector, ExecContext};

/// MATCH+REMOVE: per matched row, drop labels or single typed properties.
pub fn execute_match_remove_query(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    remove: &RemoveClause<'_>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let matches = match_clauses_of(query);
    let bindings = run_match_selector(ctx, &matches)?;

    for row in &bindings.rows {
        let mut var_map = bindings.var_map_for_row(row);
        execute_remove_operations(ctx, remove, &mut var_map, stats)?;
    }
    Ok(())
}

pub fn execute_remove_operations(
    ctx: &ExecContext<'_>,
    remove: &RemoveClause<'_>,
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let schema = SqliteSchema::new(ctx.conn);

    for item in &remove.items {
        match item {
            RemoveItem::Label { variable, label } => {
                let node_id = var_map
                    .node_id(variable)
                    .ok_or_else(|| EngineError::unbound(*variable))?;
                if schema.remove_node_label(node_id, label)? {
                    stats.properties_set += 1;
                }
            }
            RemoveItem::Property(prop) => {
                let removed = if var_map.is_edge(prop.base) {
                    let edge_id = var_map
                        .edge_id(prop.base)
                        .ok_or_else(|| EngineError::unbound(prop.base))?;
                    schema.delete_edge_property(edge_id, prop.key)?
                } else {
                    let node_id = var_map
                        .node_id(prop.base)
                        .ok_or_else(|| EngineError::unbound(prop.base))?;
                    schema.delete_node_property(node_id, prop.key)?
                };
                if removed {
                    stats.properties_set += 1;
                }
            }
        }
    }
    Ok(())
}
