use crate::cypher_parser::ast::{Expression, Query, SetClause, SetItem};
use crate::error::EngineError;
use crate::schema::{SchemaFacade, SqliteSchema};

use super::result::QueryStats;
use super::variable_map::VariableMap;
use super::{evaluate_property_value, match_clauses_of, run_match_selector, ExecContext};

/// MATCH+SET: enumerate matches first, then apply the SET items per row.
pub fn execute_match_set_query(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    set: &SetClause<'_>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let matches = match_clauses_of(query);
    let bindings = run_match_selector(ctx, &matches)?;

    for row in &bindings.rows {
        let mut var_map = bindings.var_map_for_row(row);
        execute_set_items(ctx, &set.items, &mut var_map, stats)?;
    }
    Ok(())
}

/// Apply SET items against bound variables. Shared with MERGE's
/// ON CREATE / ON MATCH blocks.
pub fn execute_set_items(
    ctx: &ExecContext<'_>,
    items: &[SetItem<'_>],
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let schema = SqliteSchema::new(ctx.conn);

    for item in items {
        match item {
            SetItem::Label { variable, label } => {
                let node_id = var_map
                    .node_id(variable)
                    .ok_or_else(|| EngineError::unbound(*variable))?;
                schema.add_node_label(node_id, label)?;
                // Label adds share the properties_set counter.
                stats.properties_set += 1;
            }
            SetItem::Property { target, value } => {
                // Only literals and parameters are valid SET values.
                if !matches!(
                    value,
                    Expression::Literal(_) | Expression::Parameter(_)
                ) {
                    return Err(EngineError::TypeMismatch(
                        "SET value must be a literal or parameter".to_string(),
                    ));
                }
                let Some(prop_value) = evaluate_property_value(value, ctx.params, None)? else {
                    continue;
                };

                if var_map.is_edge(target.base) {
                    let edge_id = var_map
                        .edge_id(target.base)
                        .ok_or_else(|| EngineError::unbound(target.base))?;
                    schema.set_edge_property(edge_id, target.key, &prop_value)?;
                } else {
                    let node_id = var_map
                        .node_id(target.base)
                        .ok_or_else(|| EngineError::unbound(target.base))?;
                    schema.set_node_property(node_id, target.key, &prop_value)?;
                }
                stats.properties_set += 1;
            }
        }
    }
    Ok(())
}
