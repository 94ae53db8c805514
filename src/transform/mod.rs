//! Translation of parsed queries into SQLite SQL.
//!
//! The builder accumulates SELECT items, table references, join conditions,
//! WHERE predicates, grouping, ordering, and prepended recursive CTEs in
//! separate buffers, then finalizes them into one statement.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::cypher_parser::ast::{
    Clause, Expression, ExistsExpr, ListPredicateKind, Literal, MatchClause, NodePattern,
    Operator, PathElement, PathPattern, Property, Query, ReturnClause, ReturnItem, UnwindClause,
    WithClause,
};
use crate::schema::{EDGE_PROP_TABLES, NODE_PROP_TABLES};

pub mod errors;
pub mod variables;
pub mod varlen_cte;

pub use errors::TransformError;
use variables::{PathElementInfo, VariableContext, VarKind};
use varlen_cte::VarlenCteGenerator;

lazy_static! {
    /// Cypher scalar function names that translate to a plain SQL rename.
    static ref SCALAR_FUNCTIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("toupper", "upper");
        m.insert("tolower", "lower");
        m.insert("upper", "upper");
        m.insert("lower", "lower");
        m.insert("trim", "trim");
        m.insert("abs", "abs");
        m.insert("round", "round");
        m.insert("coalesce", "coalesce");
        m.insert("reverse", "REVERSE");
        m.insert("size", "json_array_length");
        m
    };
}

const AGGREGATE_FUNCTIONS: [&str; 6] = ["count", "sum", "avg", "min", "max", "collect"];

fn is_aggregate_name(name: &str) -> bool {
    AGGREGATE_FUNCTIONS.contains(&name.to_lowercase().as_str())
}

/// Does the expression contain an aggregate function call anywhere?
pub fn contains_aggregate(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::FunctionCall(func) => {
            is_aggregate_name(func.name) || func.args.iter().any(contains_aggregate)
        }
        Expression::BinaryOp(op) => op.operands.iter().any(contains_aggregate),
        Expression::Not(inner) => contains_aggregate(inner),
        Expression::NullCheck { expr, .. } => contains_aggregate(expr),
        Expression::Case(case) => {
            case.scrutinee.as_deref().map(contains_aggregate).unwrap_or(false)
                || case
                    .when_then
                    .iter()
                    .any(|(w, t)| contains_aggregate(w) || contains_aggregate(t))
                || case.else_expr.as_deref().map(contains_aggregate).unwrap_or(false)
        }
        _ => false,
    }
}

fn references_name(expr: &Expression<'_>, names: &[&str]) -> bool {
    match expr {
        Expression::Identifier(name) => names.contains(name),
        Expression::BinaryOp(op) => op.operands.iter().any(|e| references_name(e, names)),
        Expression::Not(inner) => references_name(inner, names),
        Expression::NullCheck { expr, .. } => references_name(expr, names),
        Expression::FunctionCall(func) => func.args.iter().any(|e| references_name(e, names)),
        _ => false,
    }
}

fn escape_string(text: &str) -> String {
    text.replace('\'', "''")
}

/// Escape LIKE metacharacters in a literal operand; the generated predicate
/// carries `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    escape_string(text)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// SQL-generation context for one query. Owns the variable context and the
/// builder buffers; finalization assembles a single statement.
#[derive(Default)]
pub struct TransformContext {
    pub vars: VariableContext,
    select_items: Vec<String>,
    from_tables: Vec<String>,
    left_joins: Vec<String>,
    join_conditions: Vec<String>,
    where_predicates: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    skip: Option<i64>,
    limit: Option<i64>,
    distinct: bool,
    ctes: Vec<String>,
    node_counter: usize,
    edge_counter: usize,
    label_counter: usize,
    cte_counter: usize,
    unwind_counter: usize,
    optional_counter: usize,
    subquery_counter: usize,
    /// Prefix applied to generated aliases; subcontexts get their own so
    /// correlated subqueries never shadow outer table aliases.
    alias_prefix: String,
    /// Iteration variables of list comprehensions/predicates, innermost last.
    local_bindings: Vec<(String, String)>,
}

impl TransformContext {
    pub fn new() -> Self {
        TransformContext::default()
    }

    /// A child context for a correlated subquery (OPTIONAL MATCH, EXISTS,
    /// pattern comprehensions) with a non-colliding alias namespace.
    fn subcontext(&mut self) -> TransformContext {
        let n = self.subquery_counter;
        self.subquery_counter += 1;
        TransformContext {
            alias_prefix: format!("{}sq{}_", self.alias_prefix, n),
            ..TransformContext::default()
        }
    }

    fn next_node_alias(&mut self) -> String {
        let alias = format!("{}n_{}", self.alias_prefix, self.node_counter);
        self.node_counter += 1;
        alias
    }

    fn next_edge_alias(&mut self) -> String {
        let alias = format!("{}e_{}", self.alias_prefix, self.edge_counter);
        self.edge_counter += 1;
        alias
    }

    pub fn has_ctes(&self) -> bool {
        !self.ctes.is_empty()
    }

    /// Translate a full (read) query: MATCH / UNWIND / WITH / RETURN in
    /// textual order. Write clauses are handled by the executors, not here;
    /// they are skipped so EXPLAIN can still show the reading part.
    pub fn transform_query(&mut self, query: &Query<'_>) -> Result<String, TransformError> {
        for clause in &query.clauses {
            match clause {
                Clause::Match(m) => self.transform_match_clause(m)?,
                Clause::Unwind(u) => self.transform_unwind_clause(u)?,
                Clause::With(w) => self.transform_with_clause(w)?,
                Clause::Return(r) => self.transform_return_clause(r)?,
                Clause::LoadCsv(_) => {
                    return Err(TransformError::unsupported(
                        "LOAD CSV",
                        "no execution pattern is registered for LOAD CSV",
                    ))
                }
                _ => {}
            }
        }
        Ok(self.build_select_sql())
    }

    // ----- MATCH -----

    pub fn transform_match_clause(&mut self, clause: &MatchClause<'_>) -> Result<(), TransformError> {
        self.vars.enter_clause();

        if clause.optional {
            return self.transform_optional_match(clause);
        }

        for pattern in &clause.patterns {
            self.add_pattern(pattern, clause.source_graph)?;
        }
        if let Some(where_expr) = &clause.where_clause {
            let sql = self.expr_to_sql(where_expr)?;
            self.where_predicates.push(sql);
        }
        Ok(())
    }

    /// OPTIONAL MATCH compiles to a LEFT JOIN against a subquery holding the
    /// optional pattern; shared variables correlate through the ON clause.
    fn transform_optional_match(&mut self, clause: &MatchClause<'_>) -> Result<(), TransformError> {
        let mut inner = self.subcontext();
        for pattern in &clause.patterns {
            inner.add_pattern(pattern, clause.source_graph)?;
        }
        if let Some(where_expr) = &clause.where_clause {
            let sql = inner.expr_to_sql(where_expr)?;
            inner.where_predicates.push(sql);
        }

        let opt_alias = format!("opt_{}", self.optional_counter);
        self.optional_counter += 1;

        let mut columns = Vec::new();
        let mut on_conditions = Vec::new();
        let mut new_vars: Vec<(String, VarKind, String, Option<String>)> = Vec::new();

        for var in inner.vars.iter() {
            if !matches!(var.kind, VarKind::Node | VarKind::Edge) {
                continue;
            }
            let Some(id_sql) = var.id_sql() else { continue };
            let column = format!("{}_id", var.name);
            columns.push(format!("{} AS {}", id_sql, column));

            match self.vars.lookup(&var.name) {
                Some(outer) if matches!(outer.kind, VarKind::Node | VarKind::Edge) => {
                    if let Some(outer_id) = outer.id_sql() {
                        on_conditions.push(format!("{}.{} = {}", opt_alias, column, outer_id));
                    }
                }
                _ => {
                    new_vars.push((
                        var.name.clone(),
                        var.kind,
                        format!("{}.{}", opt_alias, column),
                        var.label.clone(),
                    ));
                }
            }
        }

        if columns.is_empty() {
            columns.push("1 AS _one".to_string());
        }

        let sub_sql = inner.build_projected_sql(&columns);
        let on_sql = if on_conditions.is_empty() {
            "1 = 1".to_string()
        } else {
            on_conditions.join(" AND ")
        };
        self.left_joins
            .push(format!("LEFT JOIN ({}) {} ON {}", sub_sql, opt_alias, on_sql));

        for (name, kind, alias, label) in new_vars {
            match kind {
                VarKind::Node => self.vars.register_node(&name, &alias, label.as_deref()),
                VarKind::Edge => self.vars.register_edge(&name, &alias, label.as_deref()),
                _ => {}
            }
        }

        Ok(())
    }

    fn add_pattern(
        &mut self,
        pattern: &PathPattern<'_>,
        source_graph: Option<&str>,
    ) -> Result<(), TransformError> {
        // Nodes first: aliases in appearance order, shared names reuse the
        // existing alias so patterns connect.
        let mut node_ids = Vec::new();
        for element in &pattern.elements {
            if let PathElement::Node(node) = element {
                node_ids.push(self.add_node_pattern(node, source_graph)?);
            }
        }

        let mut path_exprs = vec![node_ids[0].clone()];
        let mut varlen_cte: Option<String> = None;
        let mut node_index = 0;

        for element in &pattern.elements {
            let PathElement::Rel(rel) = element else { continue };
            let src = node_ids[node_index].clone();
            let tgt = node_ids[node_index + 1].clone();
            node_index += 1;

            if let Some(range) = rel.varlen {
                if range.has_max() && range.min_hops >= 0 && range.min_hops > range.max_hops {
                    return Err(TransformError::InvalidVarlenRange {
                        min: range.min_hops as u32,
                        max: range.max_hops as u32,
                    });
                }
                let cte_name = format!("vlp_{}", self.cte_counter);
                self.cte_counter += 1;

                let generator = VarlenCteGenerator::new(
                    cte_name.clone(),
                    range,
                    &rel.types,
                    rel.direction(),
                    pattern.kind,
                );
                self.ctes.push(generator.generate());
                self.from_tables.push(cte_name.clone());
                self.join_conditions.push(format!(
                    "{cte}.source = {src} AND {cte}.target = {tgt}",
                    cte = cte_name,
                    src = src,
                    tgt = tgt,
                ));
                self.join_conditions.push(generator.depth_predicate());
                if let Some(shortest) = generator.shortest_predicate() {
                    self.join_conditions.push(shortest);
                }
                varlen_cte = Some(cte_name);
            } else {
                let alias = self.next_edge_alias();
                self.from_tables.push(format!("edges {}", alias));

                let direction_sql = match rel.direction() {
                    crate::cypher_parser::ast::Direction::Outgoing => format!(
                        "{a}.source_id = {src} AND {a}.target_id = {tgt}",
                        a = alias, src = src, tgt = tgt
                    ),
                    crate::cypher_parser::ast::Direction::Incoming => format!(
                        "{a}.source_id = {tgt} AND {a}.target_id = {src}",
                        a = alias, src = src, tgt = tgt
                    ),
                    crate::cypher_parser::ast::Direction::Either => format!(
                        "(({a}.source_id = {src} AND {a}.target_id = {tgt}) OR \
                         ({a}.source_id = {tgt} AND {a}.target_id = {src}))",
                        a = alias, src = src, tgt = tgt
                    ),
                };
                self.join_conditions.push(direction_sql);

                if !rel.types.is_empty() {
                    if rel.types.len() == 1 {
                        self.join_conditions
                            .push(format!("{}.type = '{}'", alias, escape_string(rel.types[0])));
                    } else {
                        let list = rel
                            .types
                            .iter()
                            .map(|t| format!("'{}'", escape_string(t)))
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.join_conditions.push(format!("{}.type IN ({})", alias, list));
                    }
                }

                if let Some(properties) = &rel.properties {
                    let id_expr = format!("{}.id", alias);
                    for property in properties {
                        let predicate = self.property_filter_sql(&id_expr, false, property)?;
                        self.join_conditions.push(predicate);
                    }
                }

                if let Some(name) = rel.variable {
                    self.vars.register_edge(name, &alias, rel.first_type());
                }
                path_exprs.push(format!("{}.id", alias));
            }
            path_exprs.push(tgt);
        }

        if let Some(path_name) = pattern.variable {
            let elements: Vec<PathElementInfo> = pattern
                .elements
                .iter()
                .map(|e| match e {
                    PathElement::Node(n) => PathElementInfo::Node {
                        label: n.first_label().map(|l| l.to_string()),
                    },
                    PathElement::Rel(_) => PathElementInfo::Rel,
                })
                .collect();

            match varlen_cte {
                Some(cte_name) => {
                    self.vars
                        .register_path(path_name, &cte_name, elements, pattern.kind);
                    self.vars.set_cte(path_name, &cte_name);
                }
                None => {
                    let alias = format!("json_array({})", path_exprs.join(", "));
                    self.vars
                        .register_path(path_name, &alias, elements, pattern.kind);
                }
            }
            if let Some(graph) = source_graph {
                self.vars.set_graph(path_name, graph);
            }
        }

        Ok(())
    }

    fn add_node_pattern(
        &mut self,
        node: &NodePattern<'_>,
        source_graph: Option<&str>,
    ) -> Result<String, TransformError> {
        // Re-use the alias of an already-bound variable so repeated mentions
        // of the same name connect patterns instead of multiplying rows.
        let existing = node
            .variable
            .and_then(|name| self.vars.lookup_node(name))
            .and_then(|var| var.id_sql());
        if let Some(id_expr) = existing {
            self.apply_node_constraints(node, &id_expr)?;
            return Ok(id_expr);
        }

        let alias = self.next_node_alias();
        self.from_tables.push(format!("nodes {}", alias));
        let id_expr = format!("{}.id", alias);

        self.apply_node_constraints(node, &id_expr)?;

        if let Some(name) = node.variable {
            self.vars.register_node(name, &alias, node.first_label());
            if let Some(graph) = source_graph {
                self.vars.set_graph(name, graph);
            }
        }
        Ok(id_expr)
    }

    fn apply_node_constraints(
        &mut self,
        node: &NodePattern<'_>,
        id_expr: &str,
    ) -> Result<(), TransformError> {
        // One node_labels join per required label (labels are conjunctive).
        for label in &node.labels {
            let label_alias = format!("nl_{}", self.label_counter);
            self.label_counter += 1;
            self.from_tables.push(format!("node_labels {}", label_alias));
            self.join_conditions.push(format!(
                "{la}.node_id = {id} AND {la}.label = '{label}'",
                la = label_alias,
                id = id_expr,
                label = escape_string(label),
            ));
        }

        if let Some(properties) = &node.properties {
            for property in properties {
                let predicate = self.property_filter_sql(id_expr, true, property)?;
                self.join_conditions.push(predicate);
            }
        }
        Ok(())
    }

    /// Inline `{k: v}` filter: a typed EXISTS through property_keys. When the
    /// value's type is unknown at build time (parameters, computed values),
    /// all four typed tables are probed.
    fn property_filter_sql(
        &mut self,
        id_expr: &str,
        is_node: bool,
        property: &Property<'_>,
    ) -> Result<String, TransformError> {
        let Property::Pair(pair) = property else {
            return Err(TransformError::unsupported(
                "MATCH",
                "whole-map parameter properties are only valid in CREATE/MERGE",
            ));
        };

        let (tables, id_column): (&[&str], &str) = if is_node {
            (&NODE_PROP_TABLES, "node_id")
        } else {
            (&EDGE_PROP_TABLES, "edge_id")
        };

        let typed_table = match &pair.value {
            Expression::Literal(Literal::String(_)) => Some(tables[0]),
            Expression::Literal(Literal::Integer(_)) => Some(tables[1]),
            Expression::Literal(Literal::Decimal(_)) => Some(tables[2]),
            Expression::Literal(Literal::Boolean(_)) => Some(tables[3]),
            Expression::Literal(Literal::Null) => {
                return Err(TransformError::unsupported(
                    "MATCH",
                    "null is not a valid inline property filter",
                ))
            }
            _ => None,
        };

        let value_sql = self.expr_to_sql(&pair.value)?;
        let key = escape_string(pair.key);

        let exists_for = |table: &str| {
            format!(
                "EXISTS (SELECT 1 FROM {table} p JOIN property_keys k ON p.key_id = k.id \
                 WHERE p.{id_col} = {id} AND k.key = '{key}' AND p.value = {value})",
                table = table,
                id_col = id_column,
                id = id_expr,
                key = key,
                value = value_sql,
            )
        };

        Ok(match typed_table {
            Some(table) => exists_for(table),
            None => {
                let probes: Vec<String> = tables.iter().map(|t| exists_for(t)).collect();
                format!("({})", probes.join(" OR "))
            }
        })
    }

    // ----- RETURN / WITH / UNWIND -----

    pub fn transform_return_clause(
        &mut self,
        clause: &ReturnClause<'_>,
    ) -> Result<(), TransformError> {
        if clause.items.is_empty() {
            return Err(TransformError::EmptyReturn);
        }
        self.distinct |= clause.distinct;

        let mut item_sqls = Vec::new();
        let mut has_aggregate = false;
        let mut plain_sqls = Vec::new();

        for item in &clause.items {
            let sql = self.projection_sql(&item.expression)?;
            if contains_aggregate(&item.expression) {
                has_aggregate = true;
            } else {
                plain_sqls.push(sql.clone());
            }
            item_sqls.push(sql);
        }

        for (i, sql) in item_sqls.iter().enumerate() {
            self.select_items.push(format!("{} AS col_{}", sql, i));
        }

        if has_aggregate && !plain_sqls.is_empty() && self.group_by.is_empty() {
            self.group_by = plain_sqls;
        }

        for order_item in &clause.order_by {
            let sql = self.order_expr_sql(&order_item.expression, &clause.items)?;
            self.order_by.push(format!(
                "{}{}",
                sql,
                if order_item.descending { " DESC" } else { " ASC" }
            ));
        }

        if clause.skip.is_some() {
            self.skip = clause.skip;
        }
        if clause.limit.is_some() {
            self.limit = clause.limit;
        }
        Ok(())
    }

    fn order_expr_sql(
        &mut self,
        expr: &Expression<'_>,
        items: &[ReturnItem<'_>],
    ) -> Result<String, TransformError> {
        if let Expression::Identifier(name) = expr {
            for (i, item) in items.iter().enumerate() {
                if item.alias == Some(*name) {
                    return Ok(format!("col_{}", i));
                }
                if item.alias.is_none() && item.expression == Expression::Identifier(*name) {
                    return Ok(format!("col_{}", i));
                }
            }
        }
        self.expr_to_sql(expr)
    }

    pub fn transform_with_clause(&mut self, clause: &WithClause<'_>) -> Result<(), TransformError> {
        self.vars.enter_clause();
        self.distinct |= clause.distinct;

        let mut projected_names: Vec<&str> = Vec::new();
        let mut aggregate_names: Vec<&str> = Vec::new();
        let mut group_sqls: Vec<String> = Vec::new();
        let mut any_aggregate = false;

        for item in &clause.items {
            // A bare entity variable passes through with its kind intact.
            if let Expression::Identifier(name) = item.expression {
                if let Some(var) = self.vars.lookup(name) {
                    if matches!(var.kind, VarKind::Node | VarKind::Edge | VarKind::Path) {
                        let id_sql = var.id_sql();
                        let kind = var.kind;
                        let alias = var.table_alias.clone();
                        let label = var.label.clone();
                        let target = item.alias.unwrap_or(name);
                        if target != name {
                            // WITH a AS b: rebind the same table alias.
                            if let Some(alias) = alias {
                                match kind {
                                    VarKind::Node => {
                                        self.vars.register_node(target, &alias, label.as_deref())
                                    }
                                    VarKind::Edge => {
                                        self.vars.register_edge(target, &alias, label.as_deref())
                                    }
                                    _ => {}
                                }
                            }
                        }
                        if let Some(id_sql) = id_sql {
                            group_sqls.push(id_sql);
                        }
                        projected_names.push(target);
                        continue;
                    }
                }
            }

            let sql = self.expr_to_sql(&item.expression)?;
            let name = match item.alias {
                Some(alias) => alias,
                // A bare projected/aggregated variable keeps its own name.
                None => match item.expression {
                    Expression::Identifier(n) => n,
                    _ => {
                        return Err(TransformError::unsupported(
                            "WITH",
                            "expression items require an AS alias",
                        ))
                    }
                },
            };
            if contains_aggregate(&item.expression) {
                any_aggregate = true;
                self.vars.register_aggregated(name, &sql);
                aggregate_names.push(name);
            } else {
                self.vars.register_projected(name, &sql);
                group_sqls.push(sql);
            }
            projected_names.push(name);
        }

        if any_aggregate && !group_sqls.is_empty() && self.group_by.is_empty() {
            self.group_by = group_sqls;
        }

        if let Some(where_expr) = &clause.where_clause {
            let sql = self.expr_to_sql(where_expr)?;
            if references_name(where_expr, &aggregate_names) {
                self.having.push(sql);
            } else {
                self.where_predicates.push(sql);
            }
        }

        for order_item in &clause.order_by {
            let sql = self.expr_to_sql(&order_item.expression)?;
            self.order_by.push(format!(
                "{}{}",
                sql,
                if order_item.descending { " DESC" } else { " ASC" }
            ));
        }
        if clause.skip.is_some() {
            self.skip = clause.skip;
        }
        if clause.limit.is_some() {
            self.limit = clause.limit;
        }

        self.vars.project(&projected_names);
        Ok(())
    }

    pub fn transform_unwind_clause(
        &mut self,
        clause: &UnwindClause<'_>,
    ) -> Result<(), TransformError> {
        let list_sql = self.expr_to_sql(&clause.expression)?;
        let alias = format!("u_{}", self.unwind_counter);
        self.unwind_counter += 1;
        self.from_tables
            .push(format!("json_each({}) AS {}", list_sql, alias));
        self.vars
            .register_projected(clause.alias, &format!("{}.value", alias));
        Ok(())
    }

    // ----- projections -----

    /// SELECT expression for one RETURN item. Graph entities become JSON
    /// objects; paths become their id arrays; everything else is scalar SQL.
    pub fn projection_sql(&mut self, expr: &Expression<'_>) -> Result<String, TransformError> {
        if let Expression::Identifier(name) = expr {
            let info = self.vars.lookup(name).map(|var| {
                (
                    var.kind,
                    var.id_sql(),
                    var.cte_name.clone(),
                    var.table_alias.clone(),
                    var.source_expr.clone(),
                )
            });
            match info {
                Some((VarKind::Node, Some(id), _, _, _)) => return Ok(node_json_sql(&id)),
                Some((VarKind::Edge, Some(id), _, _, _)) => return Ok(edge_json_sql(&id)),
                Some((VarKind::Path, _, cte, alias, _)) => {
                    return Ok(match cte {
                        Some(cte_name) => format!("{}.path_ids", cte_name),
                        None => alias.unwrap_or_default(),
                    })
                }
                Some((VarKind::Projected | VarKind::Aggregated, _, _, _, Some(source))) => {
                    return Ok(source)
                }
                Some(_) => {}
                None => return Err(TransformError::UnknownVariable((*name).to_string())),
            }
        }
        self.expr_to_sql(expr)
    }

    // ----- expressions -----

    pub fn expr_to_sql(&mut self, expr: &Expression<'_>) -> Result<String, TransformError> {
        match expr {
            Expression::Literal(lit) => Ok(match lit {
                Literal::Integer(i) => i.to_string(),
                Literal::Decimal(d) => d.to_string(),
                Literal::String(s) => format!("'{}'", escape_string(s)),
                Literal::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
                Literal::Null => "NULL".to_string(),
            }),
            Expression::Parameter(name) => Ok(format!(":{}", name)),
            Expression::Identifier(name) => self.identifier_sql(name),
            Expression::Property(prop) => self.property_read_sql(prop.base, prop.key),
            Expression::Label { variable, label } => {
                let var = self
                    .vars
                    .lookup_node(variable)
                    .ok_or_else(|| TransformError::UnknownVariable((*variable).to_string()))?;
                let id = var
                    .id_sql()
                    .ok_or_else(|| TransformError::NotAnEntity((*variable).to_string()))?;
                Ok(format!(
                    "EXISTS (SELECT 1 FROM node_labels WHERE node_id = {} AND label = '{}')",
                    id,
                    escape_string(label)
                ))
            }
            Expression::Not(inner) => Ok(format!("NOT ({})", self.expr_to_sql(inner)?)),
            Expression::NullCheck { expr, is_not } => Ok(format!(
                "({} IS {}NULL)",
                self.expr_to_sql(expr)?,
                if *is_not { "NOT " } else { "" }
            )),
            Expression::BinaryOp(op) => self.binary_op_sql(op),
            Expression::FunctionCall(func) => self.function_call_sql(func),
            Expression::Exists(exists) => self.exists_sql(exists),
            Expression::ListPredicate(pred) => self.list_predicate_sql(pred),
            Expression::List(items) => {
                let rendered: Result<Vec<_>, _> =
                    items.iter().map(|e| self.expr_to_sql(e)).collect();
                Ok(format!("json_array({})", rendered?.join(", ")))
            }
            Expression::ListComprehension(comp) => {
                let list_sql = self.expr_to_sql(&comp.list)?;
                self.local_bindings
                    .push((comp.variable.to_string(), "j.value".to_string()));
                let where_sql = match &comp.where_clause {
                    Some(w) => Some(self.expr_to_sql(w)?),
                    None => None,
                };
                let transform_sql = match &comp.transform {
                    Some(t) => self.expr_to_sql(t)?,
                    None => "j.value".to_string(),
                };
                self.local_bindings.pop();
                Ok(format!(
                    "(SELECT json_group_array({}) FROM json_each({}) j{})",
                    transform_sql,
                    list_sql,
                    where_sql
                        .map(|w| format!(" WHERE {}", w))
                        .unwrap_or_default()
                ))
            }
            Expression::PatternComprehension(comp) => {
                let mut inner = self.subcontext();
                inner.add_pattern(&comp.pattern, None)?;
                self.correlate_subcontext(&mut inner);
                if let Some(where_expr) = &comp.where_clause {
                    let sql = inner.expr_to_sql(where_expr)?;
                    inner.where_predicates.push(sql);
                }
                let projection = inner.expr_to_sql(&comp.projection)?;
                let columns = vec![format!("json_group_array({})", projection)];
                Ok(format!("({})", inner.build_projected_sql(&columns)))
            }
            Expression::Map(entries) => {
                let mut parts = Vec::new();
                for (key, value) in entries {
                    parts.push(format!("'{}'", escape_string(key)));
                    parts.push(self.expr_to_sql(value)?);
                }
                Ok(format!("json_object({})", parts.join(", ")))
            }
            Expression::MapProjection(projection) => {
                let mut parts = Vec::new();
                for item in &projection.items {
                    match item {
                        crate::cypher_parser::ast::MapProjectionItem::Property(key) => {
                            parts.push(format!("'{}'", escape_string(key)));
                            parts.push(self.property_read_sql(projection.base, key)?);
                        }
                        crate::cypher_parser::ast::MapProjectionItem::Entry { key, value } => {
                            parts.push(format!("'{}'", escape_string(key)));
                            parts.push(self.expr_to_sql(value)?);
                        }
                    }
                }
                Ok(format!("json_object({})", parts.join(", ")))
            }
            Expression::Case(case) => {
                let mut sql = String::from("CASE");
                if let Some(scrutinee) = &case.scrutinee {
                    sql.push(' ');
                    sql.push_str(&self.expr_to_sql(scrutinee)?);
                }
                for (when, then) in &case.when_then {
                    sql.push_str(&format!(
                        " WHEN {} THEN {}",
                        self.expr_to_sql(when)?,
                        self.expr_to_sql(then)?
                    ));
                }
                if let Some(else_expr) = &case.else_expr {
                    sql.push_str(&format!(" ELSE {}", self.expr_to_sql(else_expr)?));
                }
                sql.push_str(" END");
                Ok(sql)
            }
            Expression::Subscript { base, index } => {
                let base_sql = self.expr_to_sql(base)?;
                let index_sql = self.expr_to_sql(index)?;
                Ok(format!(
                    "json_extract({}, '$[' || ({}) || ']')",
                    base_sql, index_sql
                ))
            }
            Expression::Slice { base, from, to } => {
                let base_sql = self.expr_to_sql(base)?;
                let mut conditions = Vec::new();
                if let Some(from) = from {
                    conditions.push(format!("j.key >= {}", self.expr_to_sql(from)?));
                }
                if let Some(to) = to {
                    conditions.push(format!("j.key < {}", self.expr_to_sql(to)?));
                }
                let filter = if conditions.is_empty() {
                    String::new()
                } else {
                    format!(" WHERE {}", conditions.join(" AND "))
                };
                Ok(format!(
                    "(SELECT json_group_array(j.value) FROM json_each({}) j{})",
                    base_sql, filter
                ))
            }
            Expression::Reduce(_) => Err(TransformError::unsupported(
                "expression",
                "reduce() cannot be translated to SQL",
            )),
        }
    }

    fn identifier_sql(&mut self, name: &str) -> Result<String, TransformError> {
        // Innermost comprehension/predicate binding wins.
        if let Some((_, sql)) = self
            .local_bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
        {
            return Ok(sql.clone());
        }

        let var = self
            .vars
            .lookup(name)
            .ok_or_else(|| TransformError::UnknownVariable(name.to_string()))?;
        match var.kind {
            VarKind::Projected | VarKind::Aggregated => var
                .source_expr
                .clone()
                .ok_or_else(|| TransformError::UnknownVariable(name.to_string())),
            _ => var
                .id_sql()
                .ok_or_else(|| TransformError::NotAnEntity(name.to_string())),
        }
    }

    /// A property read in scalar position: correlated subquery across the
    /// four typed tables, first hit wins.
    fn property_read_sql(&mut self, base: &str, key: &str) -> Result<String, TransformError> {
        let var = self
            .vars
            .lookup(base)
            .ok_or_else(|| TransformError::UnknownVariable(base.to_string()))?;

        let (tables, id_column): (&[&str], &str) = match var.kind {
            VarKind::Node => (&NODE_PROP_TABLES, "node_id"),
            VarKind::Edge => (&EDGE_PROP_TABLES, "edge_id"),
            _ => return Err(TransformError::NotAnEntity(base.to_string())),
        };
        let id = var
            .id_sql()
            .ok_or_else(|| TransformError::NotAnEntity(base.to_string()))?;

        let selects: Vec<String> = tables
            .iter()
            .map(|table| {
                format!(
                    "SELECT p.value FROM {table} p JOIN property_keys k \
                     ON p.key_id = k.id AND k.key = '{key}' WHERE p.{id_col} = {id}",
                    table = table,
                    key = escape_string(key),
                    id_col = id_column,
                    id = id,
                )
            })
            .collect();
        Ok(format!("({} LIMIT 1)", selects.join(" UNION ALL ")))
    }

    fn binary_op_sql(
        &mut self,
        op: &crate::cypher_parser::ast::OperatorApplication<'_>,
    ) -> Result<String, TransformError> {
        let lhs = self.expr_to_sql(&op.operands[0])?;

        match op.operator {
            Operator::In => {
                // Literal list keeps SQL IN; anything else unpacks via json_each.
                if let Expression::List(items) = &op.operands[1] {
                    let rendered: Result<Vec<_>, _> =
                        items.iter().map(|e| self.expr_to_sql(e)).collect();
                    return Ok(format!("({} IN ({}))", lhs, rendered?.join(", ")));
                }
                let rhs = self.expr_to_sql(&op.operands[1])?;
                return Ok(format!(
                    "EXISTS (SELECT 1 FROM json_each({}) WHERE json_each.value = {})",
                    rhs, lhs
                ));
            }
            Operator::StartsWith | Operator::EndsWith | Operator::Contains => {
                return self.like_sql(op.operator, &lhs, &op.operands[1]);
            }
            Operator::Regex => {
                return Err(TransformError::unsupported(
                    "expression",
                    "the =~ regex operator has no SQL equivalent here",
                ));
            }
            _ => {}
        }

        let rhs = self.expr_to_sql(&op.operands[1])?;
        let rendered = match op.operator {
            Operator::And => format!("({} AND {})", lhs, rhs),
            Operator::Or => format!("({} OR {})", lhs, rhs),
            // SQLite has no XOR; inequality over the boolean operands.
            Operator::Xor => format!("(({}) <> ({}))", lhs, rhs),
            Operator::Eq => format!("({} = {})", lhs, rhs),
            Operator::Neq => format!("({} <> {})", lhs, rhs),
            Operator::Lt => format!("({} < {})", lhs, rhs),
            Operator::Gt => format!("({} > {})", lhs, rhs),
            Operator::Lte => format!("({} <= {})", lhs, rhs),
            Operator::Gte => format!("({} >= {})", lhs, rhs),
            Operator::Add => format!("({} + {})", lhs, rhs),
            Operator::Sub => format!("({} - {})", lhs, rhs),
            Operator::Mul => format!("({} * {})", lhs, rhs),
            Operator::Div => format!("({} / {})", lhs, rhs),
            Operator::Mod => format!("({} % {})", lhs, rhs),
            _ => unreachable!("handled above"),
        };
        Ok(rendered)
    }

    fn like_sql(
        &mut self,
        operator: Operator,
        lhs: &str,
        rhs: &Expression<'_>,
    ) -> Result<String, TransformError> {
        if let Expression::Literal(Literal::String(text)) = rhs {
            let escaped = escape_like(text);
            let pattern = match operator {
                Operator::StartsWith => format!("{}%", escaped),
                Operator::EndsWith => format!("%{}", escaped),
                Operator::Contains => format!("%{}%", escaped),
                _ => unreachable!(),
            };
            return Ok(format!("({} LIKE '{}' ESCAPE '\\')", lhs, pattern));
        }

        let rhs_sql = self.expr_to_sql(rhs)?;
        Ok(match operator {
            Operator::StartsWith => format!("({} LIKE {} || '%')", lhs, rhs_sql),
            Operator::EndsWith => format!("({} LIKE '%' || {})", lhs, rhs_sql),
            Operator::Contains => format!("({} LIKE '%' || {} || '%')", lhs, rhs_sql),
            _ => unreachable!(),
        })
    }

    fn function_call_sql(
        &mut self,
        func: &crate::cypher_parser::ast::FunctionCall<'_>,
    ) -> Result<String, TransformError> {
        let name = func.name.to_lowercase();

        // Graph-aware builtins come first.
        match name.as_str() {
            "id" => {
                if let Some(Expression::Identifier(var_name)) = func.args.first() {
                    return self.identifier_sql(var_name);
                }
            }
            "labels" => {
                if let Some(Expression::Identifier(var_name)) = func.args.first() {
                    let var = self.vars.lookup_node(var_name).ok_or_else(|| {
                        TransformError::UnknownVariable((*var_name).to_string())
                    })?;
                    let id = var
                        .id_sql()
                        .ok_or_else(|| TransformError::NotAnEntity((*var_name).to_string()))?;
                    return Ok(format!(
                        "(SELECT json_group_array(label) FROM node_labels WHERE node_id = {})",
                        id
                    ));
                }
            }
            "type" => {
                if let Some(Expression::Identifier(var_name)) = func.args.first() {
                    let var = self.vars.lookup_edge(var_name).ok_or_else(|| {
                        TransformError::UnknownVariable((*var_name).to_string())
                    })?;
                    let id = var
                        .id_sql()
                        .ok_or_else(|| TransformError::NotAnEntity((*var_name).to_string()))?;
                    return Ok(format!("(SELECT type FROM edges WHERE id = {})", id));
                }
            }
            "length" => {
                if let Some(Expression::Identifier(var_name)) = func.args.first() {
                    if let Some(var) = self.vars.lookup_path(var_name) {
                        if let Some(cte) = &var.cte_name {
                            return Ok(format!("{}.depth", cte));
                        }
                        // Fixed-shape path: the hop count is structural.
                        let rels = var
                            .path_elements
                            .iter()
                            .filter(|e| matches!(e, PathElementInfo::Rel))
                            .count();
                        return Ok(rels.to_string());
                    }
                }
                // length() of a list value.
                let first = func.args.first().ok_or_else(|| {
                    TransformError::unsupported("expression", "length() requires an argument")
                })?;
                let arg = self.expr_to_sql(first)?;
                return Ok(format!("json_array_length({})", arg));
            }
            _ => {}
        }

        let rendered: Result<Vec<_>, _> = func
            .args
            .iter()
            .map(|arg| match arg {
                Expression::Identifier("*") => Ok("*".to_string()),
                other => self.expr_to_sql(other),
            })
            .collect();
        let args = rendered?;
        let distinct_prefix = if func.distinct { "DISTINCT " } else { "" };

        if is_aggregate_name(&name) {
            let sql_name = if name == "collect" {
                "json_group_array"
            } else {
                name.as_str()
            };
            return Ok(format!("{}({}{})", sql_name, distinct_prefix, args.join(", ")));
        }

        let sql_name = SCALAR_FUNCTIONS
            .get(name.as_str())
            .copied()
            .unwrap_or(func.name);
        Ok(format!("{}({})", sql_name, args.join(", ")))
    }

    fn exists_sql(&mut self, exists: &ExistsExpr<'_>) -> Result<String, TransformError> {
        match exists {
            ExistsExpr::Property(prop) => {
                let var = self
                    .vars
                    .lookup(prop.base)
                    .ok_or_else(|| TransformError::UnknownVariable(prop.base.to_string()))?;
                let (tables, id_column): (&[&str], &str) = match var.kind {
                    VarKind::Node => (&NODE_PROP_TABLES, "node_id"),
                    VarKind::Edge => (&EDGE_PROP_TABLES, "edge_id"),
                    _ => return Err(TransformError::NotAnEntity(prop.base.to_string())),
                };
                let id = var
                    .id_sql()
                    .ok_or_else(|| TransformError::NotAnEntity(prop.base.to_string()))?;
                let probes: Vec<String> = tables
                    .iter()
                    .map(|table| {
                        format!(
                            "EXISTS (SELECT 1 FROM {table} p JOIN property_keys k \
                             ON p.key_id = k.id WHERE p.{id_col} = {id} AND k.key = '{key}')",
                            table = table,
                            id_col = id_column,
                            id = id,
                            key = escape_string(prop.key),
                        )
                    })
                    .collect();
                Ok(format!("({})", probes.join(" OR ")))
            }
            ExistsExpr::Pattern {
                pattern,
                where_clause,
            } => {
                let mut inner = self.subcontext();
                inner.add_pattern(pattern, None)?;
                self.correlate_subcontext(&mut inner);
                if let Some(where_expr) = where_clause {
                    let sql = inner.expr_to_sql(where_expr)?;
                    inner.where_predicates.push(sql);
                }
                let columns = vec!["1".to_string()];
                Ok(format!("EXISTS ({})", inner.build_projected_sql(&columns)))
            }
        }
    }

    /// Correlate a freshly-built subcontext with this one: any variable the
    /// subquery re-declares that exists out here gets an id-equality bridge.
    fn correlate_subcontext(&self, inner: &mut TransformContext) {
        let mut bridges = Vec::new();
        for inner_var in inner.vars.iter() {
            if !matches!(inner_var.kind, VarKind::Node | VarKind::Edge) {
                continue;
            }
            if let Some(outer_var) = self.vars.lookup(&inner_var.name) {
                if let (Some(inner_id), Some(outer_id)) = (inner_var.id_sql(), outer_var.id_sql())
                {
                    bridges.push(format!("{} = {}", inner_id, outer_id));
                }
            }
        }
        inner.where_predicates.extend(bridges);
    }

    fn list_predicate_sql(
        &mut self,
        pred: &crate::cypher_parser::ast::ListPredicate<'_>,
    ) -> Result<String, TransformError> {
        let list_sql = self.expr_to_sql(&pred.list)?;
        self.local_bindings
            .push((pred.variable.to_string(), "j.value".to_string()));
        let predicate_sql = self.expr_to_sql(&pred.predicate);
        self.local_bindings.pop();
        let predicate_sql = predicate_sql?;

        Ok(match pred.kind {
            ListPredicateKind::Any => format!(
                "EXISTS (SELECT 1 FROM json_each({}) j WHERE {})",
                list_sql, predicate_sql
            ),
            ListPredicateKind::All => format!(
                "NOT EXISTS (SELECT 1 FROM json_each({}) j WHERE NOT ({}))",
                list_sql, predicate_sql
            ),
            ListPredicateKind::None => format!(
                "NOT EXISTS (SELECT 1 FROM json_each({}) j WHERE {})",
                list_sql, predicate_sql
            ),
            ListPredicateKind::Single => format!(
                "((SELECT COUNT(*) FROM json_each({}) j WHERE {}) = 1)",
                list_sql, predicate_sql
            ),
        })
    }

    // ----- finalization -----

    /// Assemble the accumulated buffers into one SELECT statement.
    pub fn build_select_sql(&self) -> String {
        let items = if self.select_items.is_empty() {
            "*".to_string()
        } else {
            self.select_items.join(", ")
        };
        self.assemble(&items, &self.group_by, &self.having, &self.order_by)
    }

    /// Same shape, but with caller-chosen projection columns and no paging.
    fn build_projected_sql(&self, columns: &[String]) -> String {
        self.assemble(&columns.join(", "), &[], &[], &[])
    }

    /// SELECT all node/edge variable ids, in registration order; used by the
    /// write executors to bind MATCH results to entity ids.
    pub fn build_bound_ids_sql(&self) -> (String, Vec<(String, VarKind)>) {
        let mut columns = Vec::new();
        let mut bound = Vec::new();
        for var in self.vars.iter() {
            if !matches!(var.kind, VarKind::Node | VarKind::Edge) {
                continue;
            }
            let Some(id_sql) = var.id_sql() else { continue };
            columns.push(format!("{} AS {}_id", id_sql, var.name));
            bound.push((var.name.clone(), var.kind));
        }
        if columns.is_empty() {
            columns.push("1".to_string());
        }
        (
            self.assemble(&columns.join(", "), &[], &[], &[]),
            bound,
        )
    }

    fn assemble(
        &self,
        items: &str,
        group_by: &[String],
        having: &[String],
        order_by: &[String],
    ) -> String {
        let mut sql = String::new();

        if !self.ctes.is_empty() {
            sql.push_str("WITH RECURSIVE ");
            sql.push_str(&self.ctes.join(",\n"));
            sql.push('\n');
        }

        sql.push_str("SELECT ");
        if self.distinct && !items.starts_with('*') {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(items);

        if !self.from_tables.is_empty() {
            sql.push_str("\nFROM ");
            sql.push_str(&self.from_tables.join(", "));
        }
        for left_join in &self.left_joins {
            sql.push('\n');
            sql.push_str(left_join);
        }

        let mut predicates = Vec::new();
        predicates.extend(self.join_conditions.iter().cloned());
        predicates.extend(self.where_predicates.iter().cloned());
        if !predicates.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if !group_by.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(&group_by.join(", "));
        }
        if !having.is_empty() {
            sql.push_str("\nHAVING ");
            sql.push_str(&having.join(" AND "));
        }
        if !order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&order_by.join(", "));
        }

        // SQLite requires LIMIT when OFFSET is present; -1 means unlimited.
        if self.limit.is_some() || self.skip.is_some() {
            sql.push_str(&format!("\nLIMIT {}", self.limit.unwrap_or(-1)));
            if let Some(skip) = self.skip {
                sql.push_str(&format!(" OFFSET {}", skip));
            }
        }

        sql
    }
}

/// Vertex projection: a JSON object assembled from correlated subqueries,
/// keyed by the node id expression. A NULL id (optional match miss) yields
/// an object with a null id that the result assembler maps to Null.
fn node_json_sql(id: &str) -> String {
    let props: Vec<String> = NODE_PROP_TABLES
        .iter()
        .map(|table| {
            format!(
                "SELECT k.key AS key, p.value AS value FROM {table} p \
                 JOIN property_keys k ON p.key_id = k.id WHERE p.node_id = {id}",
                table = table,
                id = id,
            )
        })
        .collect();
    format!(
        "json_object('id', {id}, \
         'label', (SELECT label FROM node_labels WHERE node_id = {id} LIMIT 1), \
         'properties', json(COALESCE((SELECT json_group_object(key, value) FROM ({props})), '{{}}')))",
        id = id,
        props = props.join(" UNION ALL "),
    )
}

/// Edge projection, keyed by the edge id expression.
fn edge_json_sql(id: &str) -> String {
    let props: Vec<String> = EDGE_PROP_TABLES
        .iter()
        .map(|table| {
            format!(
                "SELECT k.key AS key, p.value AS value FROM {table} p \
                 JOIN property_keys k ON p.key_id = k.id WHERE p.edge_id = {id}",
                table = table,
                id = id,
            )
        })
        .collect();
    format!(
        "json_object('id', {id}, \
         'type', (SELECT type FROM edges WHERE id = {id}), \
         'src', (SELECT source_id FROM edges WHERE id = {id}), \
         'dst', (SELECT target_id FROM edges WHERE id = {id}), \
         'properties', json(COALESCE((SELECT json_group_object(key, value) FROM ({props})), '{{}}')))",
        id = id,
        props = props.join(" UNION ALL "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser;

    fn transform(query: &str) -> (TransformContext, String) {
        let statement = cypher_parser::parse(query).expect("parse");
        let mut ctx = TransformContext::new();
        let sql = ctx.transform_query(&statement.query).expect("transform");
        (ctx, sql)
    }

    #[test]
    fn test_match_return_basic_shape() {
        let (_, sql) = transform("MATCH (n:Person) RETURN n");
        assert!(sql.contains("FROM nodes n_0, node_labels nl_0"));
        assert!(sql.contains("nl_0.label = 'Person'"));
        assert!(sql.contains("json_object('id', n_0.id"));
    }

    #[test]
    fn test_property_filter_typed_table() {
        let (_, sql) = transform("MATCH (n:Person {age: 30}) RETURN n");
        assert!(sql.contains("node_props_int"));
        assert!(!sql.contains("node_props_text p JOIN property_keys k WHERE"));

        let (_, sql) = transform("MATCH (n {name: 'Alice'}) RETURN n");
        assert!(sql.contains("node_props_text"));
    }

    #[test]
    fn test_parameter_filter_probes_all_tables() {
        let (_, sql) = transform("MATCH (p:P {name: $n}) RETURN p");
        assert!(sql.contains(":n"));
        assert!(sql.contains("node_props_text"));
        assert!(sql.contains("node_props_int"));
        assert!(sql.contains("node_props_real"));
        assert!(sql.contains("node_props_bool"));
    }

    #[test]
    fn test_relationship_direction() {
        let (_, sql) = transform("MATCH (a)-[:KNOWS]->(b) RETURN a");
        assert!(sql.contains("e_0.source_id = n_0.id AND e_0.target_id = n_1.id"));
        assert!(sql.contains("e_0.type = 'KNOWS'"));

        let (_, sql) = transform("MATCH (a)<-[:KNOWS]-(b) RETURN a");
        assert!(sql.contains("e_0.source_id = n_1.id AND e_0.target_id = n_0.id"));

        let (_, sql) = transform("MATCH (a)-[:KNOWS]-(b) RETURN a");
        assert!(sql.contains("OR"));
    }

    #[test]
    fn test_where_operators() {
        let (_, sql) = transform("MATCH (n) WHERE n.age > 18 AND n.name STARTS WITH 'Al' RETURN n");
        assert!(sql.contains("> 18"));
        assert!(sql.contains("LIKE 'Al%' ESCAPE '\\'"));
    }

    #[test]
    fn test_like_escaping() {
        let (_, sql) = transform("MATCH (n) WHERE n.code CONTAINS '10%' RETURN n");
        assert!(sql.contains("'%10\\%%'"));
    }

    #[test]
    fn test_varlen_emits_recursive_cte() {
        let (_, sql) = transform("MATCH p = (a)-[:R*2..3]->(z) RETURN length(p)");
        assert!(sql.starts_with("WITH RECURSIVE vlp_0"));
        assert!(sql.contains("vlp_0.depth >= 2 AND vlp_0.depth <= 3"));
        assert!(sql.contains("vlp_0.depth AS col_0"));
    }

    #[test]
    fn test_path_projection_fixed_shape() {
        let (_, sql) = transform("MATCH p = (a)-[r:R]->(b) RETURN p");
        assert!(sql.contains("json_array(n_0.id, e_0.id, n_1.id) AS col_0"));
    }

    #[test]
    fn test_order_skip_limit() {
        let (_, sql) = transform("MATCH (n) RETURN n.age ORDER BY n.age DESC SKIP 2 LIMIT 5");
        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("DESC"));
        assert!(sql.contains("LIMIT 5 OFFSET 2"));
    }

    #[test]
    fn test_skip_without_limit() {
        let (_, sql) = transform("MATCH (n) RETURN n SKIP 3");
        assert!(sql.contains("LIMIT -1 OFFSET 3"));
    }

    #[test]
    fn test_order_by_alias_resolves_to_column() {
        let (_, sql) = transform("MATCH (n) RETURN n.name AS name ORDER BY name");
        assert!(sql.contains("ORDER BY col_0 ASC"));
    }

    #[test]
    fn test_with_aggregate_groups() {
        let (_, sql) =
            transform("MATCH (a)-[:R]->(b) WITH a, count(*) AS c WHERE c > 1 RETURN c");
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains("HAVING"));
    }

    #[test]
    fn test_unwind_json_each() {
        let (_, sql) = transform("UNWIND [1, 2, 3] AS x RETURN x");
        assert!(sql.contains("json_each(json_array(1, 2, 3)) AS u_0"));
        assert!(sql.contains("u_0.value AS col_0"));
    }

    #[test]
    fn test_optional_match_left_join() {
        let (_, sql) = transform("MATCH (a:Person) OPTIONAL MATCH (a)-[:R]->(b) RETURN a, b");
        assert!(sql.contains("LEFT JOIN ("));
        assert!(sql.contains("opt_0"));
    }

    #[test]
    fn test_unknown_variable_is_reported() {
        let statement = cypher_parser::parse("MATCH (n) RETURN m").unwrap();
        let mut ctx = TransformContext::new();
        let err = ctx.transform_query(&statement.query).unwrap_err();
        assert!(matches!(err, TransformError::UnknownVariable(ref name) if name == "m"));
    }

    #[test]
    fn test_return_distinct() {
        let (_, sql) = transform("MATCH (n:P) RETURN DISTINCT n.city");
        assert!(sql.contains("SELECT DISTINCT"));
    }

    #[test]
    fn test_aggregate_return_groups_plain_items() {
        let (_, sql) = transform("MATCH (n:P) RETURN n.city, count(*)");
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains("count(*)"));
    }

    #[test]
    fn test_bound_ids_sql() {
        let statement = cypher_parser::parse("MATCH (a:X)-[r:R]->(b) RETURN a").unwrap();
        let mut ctx = TransformContext::new();
        let Clause::Match(m) = &statement.query.clauses[0] else {
            panic!("expected match");
        };
        ctx.transform_match_clause(m).unwrap();
        let (sql, bound) = ctx.build_bound_ids_sql();
        assert!(sql.contains("n_0.id AS a_id"));
        assert!(sql.contains("e_0.id AS r_id"));
        assert!(sql.contains("n_1.id AS b_id"));
        assert_eq!(bound.len(), 3);
        assert_eq!(bound[0].0, "a");
        assert_eq!(bound[1].1, VarKind::Edge);
    }

    #[test]
    fn test_invalid_varlen_range() {
        let statement = cypher_parser::parse("MATCH (a)-[:R*3..1]->(b) RETURN a").unwrap();
        let mut ctx = TransformContext::new();
        assert!(matches!(
            ctx.transform_query(&statement.query),
            Err(TransformError::InvalidVarlenRange { min: 3, max: 1 })
        ));
    }

    #[test]
    fn test_exists_pattern_correlates() {
        let (_, sql) = transform("MATCH (u:User) WHERE EXISTS { (u)-[:FOLLOWS]->(f) } RETURN u");
        assert!(sql.contains("EXISTS (SELECT 1"));
        // the subquery's re-declared u correlates with the outer u
        assert!(sql.contains("sq0_n_0.id = n_0.id"));
    }

    #[test]
    fn test_label_predicate_in_where() {
        let (_, sql) = transform("MATCH (n) WHERE n:Admin RETURN n");
        assert!(sql.contains("label = 'Admin'"));
    }

    #[test]
    fn test_union_free_transform_has_no_union() {
        let (_, sql) = transform("MATCH (n) RETURN n");
        assert!(!sql.contains("UNION\n"));
    }
}
