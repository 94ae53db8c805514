/// Entity kind a write-time variable is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Edge,
}

/// Maps Cypher variables to concrete entity ids during mutation. Distinct
/// from the transform-time variable context: this one carries values.
#[derive(Debug, Default)]
pub struct VariableMap {
    entries: Vec<(String, EntityKind, i64)>,
}

impl VariableMap {
    pub fn new() -> Self {
        VariableMap::default()
    }

    pub fn node_id(&self, variable: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(name, kind, _)| name == variable && *kind == EntityKind::Node)
            .map(|(_, _, id)| *id)
    }

    pub fn edge_id(&self, variable: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(name, kind, _)| name == variable && *kind == EntityKind::Edge)
            .map(|(_, _, id)| *id)
    }

    pub fn is_edge(&self, variable: &str) -> bool {
        self.entries
            .iter()
            .any(|(name, kind, _)| name == variable && *kind == EntityKind::Edge)
    }

    pub fn set_node_id(&mut self, variable: &str, node_id: i64) {
        self.set(variable, EntityKind::Node, node_id);
    }

    pub fn set_edge_id(&mut self, variable: &str, edge_id: i64) {
        self.set(variable, EntityKind::Edge, edge_id);
    }

    fn set(&mut self, variable: &str, kind: EntityKind, id: i64) {
        for entry in self.entries.iter_mut() {
            if entry.0 == variable {
                entry.1 = kind;
                entry.2 = id;
                return;
            }
        }
        self.entries.push((variable.to_string(), kind, id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_lookup() {
        let mut map = VariableMap::new();
        map.set_node_id("a", 1);
        map.set_edge_id("r", 2);

        assert_eq!(map.node_id("a"), Some(1));
        assert_eq!(map.edge_id("r"), Some(2));
        assert_eq!(map.node_id("r"), None);
        assert_eq!(map.edge_id("a"), None);
        assert!(map.is_edge("r"));
        assert!(!map.is_edge("a"));
    }

    #[test]
    fn test_rebinding_updates() {
        let mut map = VariableMap::new();
        map.set_node_id("a", 1);
        map.set_node_id("a", 5);
        assert_eq!(map.node_id("a"), Some(5));
    }
}
