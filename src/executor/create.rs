use crate::cypher_parser::ast::{
    CreateClause, NodePattern, PathElement, PathPattern, Property, RelPattern,
};
use crate::error::EngineError;
use crate::schema::{SchemaFacade, SqliteSchema};

use super::foreach::ForeachContext;
use super::result::QueryStats;
use super::variable_map::VariableMap;
use super::{evaluate_property_value, ExecContext};

/// Default relationship type when the pattern gives none.
const DEFAULT_REL_TYPE: &str = "RELATED";

/// CREATE: walk every path pattern, reusing bound variables and creating
/// everything else.
pub fn execute_create_clause(
    ctx: &ExecContext<'_>,
    create: &CreateClause<'_>,
    var_map: &mut VariableMap,
    foreach: Option<&ForeachContext>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    for pattern in &create.patterns {
        execute_path_pattern(ctx, pattern, var_map, foreach, stats)?;
    }
    Ok(())
}

/// Create one path: nodes first where needed, then each relationship between
/// consecutive nodes, honoring arrow direction (undirected writes forward).
pub fn execute_path_pattern(
    ctx: &ExecContext<'_>,
    pattern: &PathPattern<'_>,
    var_map: &mut VariableMap,
    foreach: Option<&ForeachContext>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let elements = &pattern.elements;
    let mut previous_node: Option<i64> = None;
    let mut index = 0;

    while index < elements.len() {
        match &elements[index] {
            PathElement::Node(node) => {
                previous_node = Some(ensure_node(ctx, node, var_map, foreach, stats)?);
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
                let target_node = ensure_node(ctx, target, var_map, foreach, stats)?;

                create_relationship(ctx, rel, source_node, target_node, var_map, foreach, stats)?;

                previous_node = Some(target_node);
                index += 2;
            }
        }
    }
    Ok(())
}

fn ensure_node(
    ctx: &ExecContext<'_>,
    node: &NodePattern<'_>,
    var_map: &mut VariableMap,
    foreach: Option<&ForeachContext>,
    stats: &mut QueryStats,
) -> Result<i64, EngineError> {
    if let Some(name) = node.variable {
        if let Some(existing) = var_map.node_id(name) {
            log::debug!("reusing bound node {} for variable '{}'", existing, name);
            return Ok(existing);
        }
    }

    let schema = SqliteSchema::new(ctx.conn);
    let node_id = schema.create_node()?;
    stats.nodes_created += 1;

    if let Some(name) = node.variable {
        var_map.set_node_id(name, node_id);
    }
    for label in &node.labels {
        schema.add_node_label(node_id, label)?;
    }

    if let Some(properties) = &node.properties {
        for property in properties {
            apply_property(ctx, &schema, property, node_id, false, foreach, stats)?;
        }
    }
    Ok(node_id)
}

fn create_relationship(
    ctx: &ExecContext<'_>,
    rel: &RelPattern<'_>,
    previous_node: i64,
    target_node: i64,
    var_map: &mut VariableMap,
    foreach: Option<&ForeachContext>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let schema = SqliteSchema::new(ctx.conn);
    let rel_type = rel.first_type().unwrap_or(DEFAULT_REL_TYPE);

    // `<-` swaps source and target; undirected writes are forward.
    let (source_id, target_id) = if rel.left_arrow && !rel.right_arrow {
        (target_node, previous_node)
    } else {
        (previous_node, target_node)
    };

    let edge_id = schema.create_edge(source_id, target_id, rel_type)?;
    stats.relationships_created += 1;
    log::debug!(
        "created relationship {}: {} -[:{}]-> {}",
        edge_id,
        source_id,
        rel_type,
        target_id
    );

    if let Some(name) = rel.variable {
        var_map.set_edge_id(name, edge_id);
    }

    if let Some(properties) = &rel.properties {
        for property in properties {
            apply_property(ctx, &schema, property, edge_id, true, foreach, stats)?;
        }
    }
    Ok(())
}

fn apply_property(
    ctx: &ExecContext<'_>,
    schema: &SqliteSchema<'_>,
    property: &Property<'_>,
    entity_id: i64,
    is_edge: bool,
    foreach: Option<&ForeachContext>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    match property {
        Property::Pair(pair) => {
            let Some(value) = evaluate_property_value(&pair.value, ctx.params, foreach)? else {
                return Ok(());
            };
            if is_edge {
                schema.set_edge_property(entity_id, pair.key, &value)?;
            } else {
                schema.set_node_property(entity_id, pair.key, &value)?;
            }
            stats.properties_set += 1;
        }
        // Whole-map parameter: `CREATE (n $props)`.
        Property::Param(name) => {
            let value = ctx.params.get(name).ok_or_else(|| {
                EngineError::InvalidParameter(format!("parameter '{}' not supplied", name))
            })?;
            let serde_json::Value::Object(map) = value else {
                return Err(EngineError::TypeMismatch(format!(
                    "parameter '{}' is not a property map",
                    name
                )));
            };
            for (key, entry) in map {
                let value = match entry {
                    serde_json::Value::Null => continue,
                    serde_json::Value::Bool(b) => crate::schema::PropertyValue::Bool(*b),
                    serde_json::Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            crate::schema::PropertyValue::Int(i)
                        } else {
                            crate::schema::PropertyValue::Real(n.as_f64().unwrap_or(0.0))
                        }
                    }
                    serde_json::Value::String(s) => {
                        crate::schema::PropertyValue::Text(s.clone())
                    }
                    nested => crate::schema::PropertyValue::Text(nested.to_string()),
                };
                if is_edge {
                    schema.set_edge_property(entity_id, key, &value)?;
                } else {
                    schema.set_node_property(entity_id, key, &value)?;
                }
                stats.properties_set += 1;
            }
        }
    }
    Ok(())
}
