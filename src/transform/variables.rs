use crate::cypher_parser::ast::PathKind;

/// Variable kinds tracked during translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Node,
    Edge,
    Path,
    Projected,
    Aggregated,
}

/// What a path element was in the source pattern; used for rehydration.
#[derive(Debug, Clone, PartialEq)]
pub enum PathElementInfo {
    Node { label: Option<String> },
    Rel,
}

/// One tracked Cypher variable.
#[derive(Debug, Clone)]
pub struct TransformVar {
    pub name: String,
    pub kind: VarKind,
    /// SQL table alias (`n_0`, `e_1`). For variables surfaced through a
    /// subquery the alias is a full column expression (contains a dot) and
    /// is used verbatim as the id expression.
    pub table_alias: Option<String>,
    pub declared_in_clause: u32,
    pub is_visible: bool,
    pub is_bound: bool,
    /// Source graph for multi-graph queries.
    pub graph: Option<String>,
    /// Primary label (nodes) or relationship type (edges) if known.
    pub label: Option<String>,
    pub path_elements: Vec<PathElementInfo>,
    pub path_kind: PathKind,
    /// CTE name backing a variable-length path.
    pub cte_name: Option<String>,
    /// Compiled source expression for projected/aggregated variables.
    pub source_expr: Option<String>,
}

impl TransformVar {
    /// SQL expression producing this variable's entity id.
    pub fn id_sql(&self) -> Option<String> {
        match self.kind {
            VarKind::Projected | VarKind::Aggregated => self.source_expr.clone(),
            _ => self.table_alias.as_ref().map(|alias| {
                if alias.contains('.') {
                    alias.clone()
                } else {
                    format!("{}.id", alias)
                }
            }),
        }
    }
}

/// Unified registry of Cypher variables during translation. Insertion order
/// is preserved; re-registration under the same name updates in place.
#[derive(Debug, Default)]
pub struct VariableContext {
    vars: Vec<TransformVar>,
    current_clause: u32,
}

impl VariableContext {
    pub fn new() -> Self {
        VariableContext::default()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }

    fn register(&mut self, name: &str, kind: VarKind, table_alias: Option<String>) -> usize {
        if let Some(idx) = self.index_of(name) {
            let var = &mut self.vars[idx];
            var.kind = kind;
            var.is_visible = true;
            var.declared_in_clause = self.current_clause;
            if table_alias.is_some() {
                var.table_alias = table_alias;
            }
            return idx;
        }

        self.vars.push(TransformVar {
            name: name.to_string(),
            kind,
            table_alias,
            declared_in_clause: self.current_clause,
            is_visible: true,
            is_bound: false,
            graph: None,
            label: None,
            path_elements: Vec::new(),
            path_kind: PathKind::Normal,
            cte_name: None,
            source_expr: None,
        });
        self.vars.len() - 1
    }

    pub fn register_node(&mut self, name: &str, alias: &str, label: Option<&str>) {
        let idx = self.register(name, VarKind::Node, Some(alias.to_string()));
        if let Some(label) = label {
            self.vars[idx].label = Some(label.to_string());
        }
    }

    pub fn register_edge(&mut self, name: &str, alias: &str, edge_type: Option<&str>) {
        let idx = self.register(name, VarKind::Edge, Some(alias.to_string()));
        if let Some(ty) = edge_type {
            self.vars[idx].label = Some(ty.to_string());
        }
    }

    pub fn register_path(
        &mut self,
        name: &str,
        alias: &str,
        elements: Vec<PathElementInfo>,
        kind: PathKind,
    ) {
        let idx = self.register(name, VarKind::Path, Some(alias.to_string()));
        self.vars[idx].path_elements = elements;
        self.vars[idx].path_kind = kind;
    }

    pub fn register_projected(&mut self, name: &str, source_expr: &str) {
        let idx = self.register(name, VarKind::Projected, None);
        self.vars[idx].source_expr = Some(source_expr.to_string());
    }

    pub fn register_aggregated(&mut self, name: &str, source_expr: &str) {
        let idx = self.register(name, VarKind::Aggregated, None);
        self.vars[idx].source_expr = Some(source_expr.to_string());
    }

    pub fn lookup(&self, name: &str) -> Option<&TransformVar> {
        let var = self.vars.iter().find(|v| v.name == name)?;
        if !var.is_visible {
            return None;
        }
        Some(var)
    }

    pub fn lookup_node(&self, name: &str) -> Option<&TransformVar> {
        self.lookup(name).filter(|v| v.kind == VarKind::Node)
    }

    pub fn lookup_edge(&self, name: &str) -> Option<&TransformVar> {
        self.lookup(name).filter(|v| v.kind == VarKind::Edge)
    }

    pub fn lookup_path(&self, name: &str) -> Option<&TransformVar> {
        self.lookup(name).filter(|v| v.kind == VarKind::Path)
    }

    pub fn is_path(&self, name: &str) -> bool {
        self.lookup_path(name).is_some()
    }

    pub fn is_edge(&self, name: &str) -> bool {
        self.lookup_edge(name).is_some()
    }

    pub fn enter_clause(&mut self) {
        self.current_clause += 1;
    }

    pub fn exit_clause(&mut self) {
        if self.current_clause > 0 {
            self.current_clause -= 1;
        }
    }

    /// Hide everything, then unhide the listed names. Hidden variables are
    /// retained so ORDER BY over pre-projection aggregates still resolves.
    pub fn project(&mut self, names: &[&str]) {
        for var in self.vars.iter_mut() {
            var.is_visible = false;
        }
        for name in names {
            if let Some(idx) = self.index_of(name) {
                self.vars[idx].is_visible = true;
            }
        }
    }

    pub fn set_cte(&mut self, name: &str, cte_name: &str) -> bool {
        match self.index_of(name) {
            Some(idx) => {
                self.vars[idx].cte_name = Some(cte_name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_bound(&mut self, name: &str, bound: bool) -> bool {
        match self.index_of(name) {
            Some(idx) => {
                self.vars[idx].is_bound = bound;
                true
            }
            None => false,
        }
    }

    pub fn set_graph(&mut self, name: &str, graph: &str) -> bool {
        match self.index_of(name) {
            Some(idx) => {
                self.vars[idx].graph = Some(graph.to_string());
                true
            }
            None => false,
        }
    }

    /// Iteration preserves insertion order and includes hidden entries.
    pub fn iter(&self) -> impl Iterator<Item = &TransformVar> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut ctx = VariableContext::new();
        ctx.register_node("n", "n_0", Some("Person"));
        ctx.register_edge("r", "e_0", Some("KNOWS"));

        let n = ctx.lookup_node("n").unwrap();
        assert_eq!(n.table_alias.as_deref(), Some("n_0"));
        assert_eq!(n.label.as_deref(), Some("Person"));
        assert_eq!(n.id_sql().unwrap(), "n_0.id");

        assert!(ctx.lookup_edge("n").is_none());
        assert!(ctx.lookup_node("r").is_none());
        assert!(ctx.lookup("missing").is_none());
    }

    #[test]
    fn test_reregistration_updates_in_place() {
        let mut ctx = VariableContext::new();
        ctx.register_node("n", "n_0", None);
        ctx.register_node("n", "n_1", Some("Person"));

        assert_eq!(ctx.len(), 1);
        assert_eq!(
            ctx.lookup("n").unwrap().table_alias.as_deref(),
            Some("n_1")
        );
    }

    #[test]
    fn test_projection_hides_and_retains() {
        let mut ctx = VariableContext::new();
        ctx.register_node("a", "n_0", None);
        ctx.register_node("b", "n_1", None);
        ctx.register_projected("c", "count(*)");

        ctx.project(&["a", "c"]);

        assert!(ctx.lookup("a").is_some());
        assert!(ctx.lookup("b").is_none());
        assert!(ctx.lookup("c").is_some());
        // retained, not destroyed
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut ctx = VariableContext::new();
        ctx.register_node("z", "n_0", None);
        ctx.register_node("a", "n_1", None);
        let names: Vec<&str> = ctx.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_dotted_alias_is_id_expression() {
        let mut ctx = VariableContext::new();
        ctx.register_node("b", "opt_0.b_id", None);
        assert_eq!(ctx.lookup("b").unwrap().id_sql().unwrap(), "opt_0.b_id");
    }

    #[test]
    fn test_clause_depth() {
        let mut ctx = VariableContext::new();
        ctx.enter_clause();
        ctx.register_node("n", "n_0", None);
        assert_eq!(ctx.lookup("n").unwrap().declared_in_clause, 1);
        ctx.exit_clause();
        ctx.exit_clause(); // saturates at zero
    }

    #[test]
    fn test_setters() {
        let mut ctx = VariableContext::new();
        ctx.register_path("p", "vlp_0", vec![], PathKind::Shortest);
        assert!(ctx.set_cte("p", "vlp_0"));
        assert!(ctx.set_bound("p", true));
        assert!(ctx.set_graph("p", "social"));
        assert!(!ctx.set_cte("missing", "x"));

        let p = ctx.lookup_path("p").unwrap();
        assert_eq!(p.cte_name.as_deref(), Some("vlp_0"));
        assert!(p.is_bound);
        assert_eq!(p.graph.as_deref(), Some("social"));
    }
}
