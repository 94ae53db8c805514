use rusqlite::Connection;

use crate::cypher_parser::ast::{DeleteClause, Query};
use crate::error::EngineError;
use crate::schema::{EDGE_PROP_TABLES, NODE_PROP_TABLES};

use super::result::QueryStats;
use super::variable_map::{EntityKind, VariableMap};
use super::{match_clauses_of, run_match_selector, ExecContext};

/// MATCH+DELETE: exhaustively enumerate matches, then delete each distinct
/// entity bound to a deleted variable. Non-detach deletion of a node that
/// still has incident edges aborts with a constraint violation.
pub fn execute_match_delete_query(
    ctx: &ExecContext<'_>,
    query: &Query<'_>,
    delete: &DeleteClause<'_>,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    let matches = match_clauses_of(query);
    let bindings = run_match_selector(ctx, &matches)?;

    // Collect distinct targets in row order; the same entity can appear in
    // many rows.
    let mut targets: Vec<(EntityKind, i64)> = Vec::new();
    for item in &delete.items {
        let column = bindings
            .column(item)
            .ok_or_else(|| EngineError::unbound(*item))?;
        let kind = bindings.vars[column].1;
        for row in &bindings.rows {
            let Some(id) = row[column] else { continue };
            if !targets.contains(&(kind, id)) {
                targets.push((kind, id));
            }
        }
    }

    for (kind, id) in targets {
        match kind {
            EntityKind::Node => delete_node_by_id(ctx.conn, id, delete.detach, stats)?,
            EntityKind::Edge => {
                delete_edge_by_id(ctx.conn, id, stats)?;
            }
        }
    }
    Ok(())
}

/// DELETE inside FOREACH bodies operates on the already-bound variable map.
pub fn execute_delete_items(
    ctx: &ExecContext<'_>,
    delete: &DeleteClause<'_>,
    var_map: &mut VariableMap,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    for item in &delete.items {
        if var_map.is_edge(item) {
            let edge_id = var_map
                .edge_id(item)
                .ok_or_else(|| EngineError::unbound(*item))?;
            delete_edge_by_id(ctx.conn, edge_id, stats)?;
        } else {
            let node_id = var_map
                .node_id(item)
                .ok_or_else(|| EngineError::unbound(*item))?;
            delete_node_by_id(ctx.conn, node_id, delete.detach, stats)?;
        }
    }
    Ok(())
}

/// Delete an edge and its typed property rows.
pub fn delete_edge_by_id(
    conn: &Connection,
    edge_id: i64,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    for table in EDGE_PROP_TABLES {
        conn.execute(
            &format!("DELETE FROM {} WHERE edge_id = ?1", table),
            [edge_id],
        )?;
    }
    let removed = conn.execute("DELETE FROM edges WHERE id = ?1", [edge_id])?;
    if removed > 0 {
        stats.relationships_deleted += 1;
    }
    Ok(())
}

/// Delete a node, cascading to labels and typed properties. With `detach`
/// incident edges are removed first (and counted); without it a connected
/// node is a constraint violation.
pub fn delete_node_by_id(
    conn: &Connection,
    node_id: i64,
    detach: bool,
    stats: &mut QueryStats,
) -> Result<(), EngineError> {
    // The same node can be matched by several rows; the second visit is a
    // no-op.
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM nodes WHERE id = ?1",
        [node_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Ok(());
    }

    if detach {
        let mut stmt =
            conn.prepare("SELECT id FROM edges WHERE source_id = ?1 OR target_id = ?1")?;
        let edge_ids: Vec<i64> = stmt
            .query_map([node_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        for edge_id in edge_ids {
            delete_edge_by_id(conn, edge_id, stats)?;
        }
    } else {
        let incident: i64 = conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE source_id = ?1 OR target_id = ?1",
            [node_id],
            |row| row.get(0),
        )?;
        if incident > 0 {
            return Err(EngineError::ConstraintViolation(format!(
                "cannot delete node {} because it still has {} relationship(s); use DETACH DELETE",
                node_id, incident
            )));
        }
    }

    for table in NODE_PROP_TABLES {
        conn.execute(
            &format!("DELETE FROM {} WHERE node_id = ?1", table),
            [node_id],
        )?;
    }
    conn.execute("DELETE FROM node_labels WHERE node_id = ?1", [node_id])?;
    conn.execute("DELETE FROM nodes WHERE id = ?1", [node_id])?;
    stats.nodes_deleted += 1;
    Ok(())
}
