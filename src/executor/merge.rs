use crate::cypher_parser::ast::{
    MergeClause, NodePattern, PathElement, Property, Query, RelPattern,
};
use crate::error::EngineError;
use crate::params::ParamStore;
use crate::schema::{PropertyValue, SchemaFacade, SqliteSchema};

use super::result::QueryStats;
use super::set::execute_set_items;
use super::variable_map::VariableMap;
use super::{evaluate_property_value, match_clauses_of, run_match_selector, ExecContext};

const DEFAULT_REL_TYPE: &str = "RELATED";

/// MATCH+MERGE: bind variables from the first matched row, then merge.
pub fn execute_match_merge_query(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    merge: &MergeClause<'_>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let matches = match_clauses_of(query);
    let bindings = run_match_selector(ctx, &matches)?;

    let mut var_map = match bindings.rows.first() {
        Some(row) => bindings.var_map_for_row(row),
        None => VariableMap::new(),
    };
    execute_merge_clause(ctx, merge, &mut var_map, stats)
}

/// MERGE: walk the pattern; every node and relationship is either found
/// (matched) or created, then the ON CREATE / ON MATCH items run against
/// the shared variable map.
pub fn execute_merge_clause(
    ctx: &ExecContext<'_>,
    merge: &MergeClause<'_>,
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let elements = &merge.pattern.elements;
    let mut any_created = false;
    let mut any_matched = false;
    let mut previous_node: Option<i64> = None;
    let mut index = 0;

    while index < elements.len() {
        match &elements[index] {
            PathElement::Node(node) => {
                let (node_id, created) = merge_node(ctx, node, var_map, stats)?;
                any_created |= created;
                any_matched |= !created;
                previous_node = Some(node_id);
                index += 1;
            }
            PathElement::Rel(rel) => {
                let Some(PathElement::Node(target)) = elements.get(index + 1) else {
                    return Err(EngineError::Internal(
                        "relationship pattern without a target node".to_string(),
                    ));
                };
                let source_node = previous_node.ok_or_else(|| {
                    EngineError::Internal("relationship pattern without a source node".to_string())
                })?;

                let (target_id, target_created) = merge_node(ctx, target, var_map, stats)?;
                any_created |= target_created;
                any_matched |= !target_created;

                let created = merge_relationship(ctx, rel, source_node, target_id, var_map, stats)?;
                any_created |= created;
                any_matched |= !created;

                previous_node = Some(target_id);
                index += 2;
            }
        }
    }

    if any_created && !merge.on_create.is_empty() {
        execute_set_items(ctx, &merge.on_create, var_map, stats)?;
    }
    if any_matched && !merge.on_match.is_empty() {
        execute_set_items(ctx, &merge.on_match, var_map, stats)?;
    }
    Ok(())
}

/// Literal (and parameter) properties of a pattern element, used as the
/// merge selector.
fn literal_properties(
    properties: &Option<Vec<Property<'_>>>,
    params: &ParamStore,
) -> Result<Vec<(String, PropertyValue)>, EngineError> {
    let mut out = Vec::new();
    if let Some(properties) = properties {
        for property in properties {
            if let Property::Pair(pair) = property {
                if let Some(value) = evaluate_property_value(&pair.value, params, None)? {
                    out.push((pair.key.to_string(), value));
                }
            }
        }
    }
    Ok(out)
}

/// Returns `(node_id, created)`.
fn merge_node(
    ctx: &ExecContext<'_>,
    node: &NodePattern<'_>,
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<(i64, bool), EngineError> {
    // A variable already bound earlier in the pattern is reused as-is.
    if let Some(name) = node.variable {
        if let Some(existing) = var_map.node_id(name) {
            return Ok((existing, false));
        }
    }

    let schema = SqliteSchema::new(ctx.conn);
    let props = literal_properties(&node.properties, ctx.params)?;

    if let Some(found) = schema.find_node_by_label_and_props(&node.labels, &props)? {
        log::debug!("MERGE matched existing node {}", found);
        if let Some(name) = node.variable {
            var_map.set_node_id(name, found);
        }
        return Ok((found, false));
    }

    let node_id = schema.create_node()?;
    stats.nodes_created += 1;
    for label in &node.labels {
        schema.add_node_label(node_id, label)?;
    }
    for (key, value) in &props {
        schema.set_node_property(node_id, key, value)?;
        stats.properties_set += 1;
    }
    if let Some(name) = node.variable {
        var_map.set_node_id(name, node_id);
    }
    log::debug!("MERGE created node {}", node_id);
    Ok((node_id, true))
}

/// Returns true when the relationship had to be created.
fn merge_relationship(
    ctx: &ExecContext<'_>,
    rel: &RelPattern<'_>,
    previous_node: i64,
    target_node: i64,
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<bool, EngineError> {
    let schema = SqliteSchema::new(ctx.conn);
    let rel_type = rel.first_type().unwrap_or(DEFAULT_REL_TYPE);

    let (source_id, target_id) = if rel.left_arrow && !rel.right_arrow {
        (target_node, previous_node)
    } else {
        (previous_node, target_node)
    };

    let props = literal_properties(&rel.properties, ctx.params)?;

    if let Some(found) = schema.find_edge(source_id, target_id, Some(rel_type), &props)? {
        log::debug!("MERGE matched existing relationship {}", found);
        if let Some(name) = rel.variable {
            var_map.set_edge_id(name, found);
        }
        return Ok(false);
    }

    let edge_id = schema.create_edge(source_id, target_id, rel_type)?;
    stats.relationships_created += 1;
    for (key, value) in &props {
        schema.set_edge_property(edge_id, key, value)?;
        stats.properties_set += 1;
    }
    if let Some(name) = rel.variable {
        var_map.set_edge_id(name, edge_id);
    }
    log::debug!("MERGE created relationship {}", edge_id);
    Ok(true)
}
