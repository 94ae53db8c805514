use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::error::EngineError;

/// The four typed property stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Text,
    Int,
    Real,
    Bool,
}

/// A concrete property value headed for one of the typed tables.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Text(_) => PropertyType::Text,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Real(_) => PropertyType::Real,
            PropertyValue::Bool(_) => PropertyType::Bool,
        }
    }

    fn to_sql_value(&self) -> rusqlite::types::Value {
        match self {
            PropertyValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
            PropertyValue::Int(i) => rusqlite::types::Value::Integer(*i),
            PropertyValue::Real(r) => rusqlite::types::Value::Real(*r),
            PropertyValue::Bool(b) => rusqlite::types::Value::Integer(*b as i64),
        }
    }
}

fn node_props_table(ty: PropertyType) -> &'static str {
    match ty {
        PropertyType::Text => "node_props_text",
        PropertyType::Int => "node_props_int",
        PropertyType::Real => "node_props_real",
        PropertyType::Bool => "node_props_bool",
    }
}

fn edge_props_table(ty: PropertyType) -> &'static str {
    match ty {
        PropertyType::Text => "edge_props_text",
        PropertyType::Int => "edge_props_int",
        PropertyType::Real => "edge_props_real",
        PropertyType::Bool => "edge_props_bool",
    }
}

pub const NODE_PROP_TABLES: [&str; 4] = [
    "node_props_text",
    "node_props_int",
    "node_props_real",
    "node_props_bool",
];

pub const EDGE_PROP_TABLES: [&str; 4] = [
    "edge_props_text",
    "edge_props_int",
    "edge_props_real",
    "edge_props_bool",
];

/// Narrow mutation interface over the property-graph schema. The engine and
/// the write executors go through this; nothing else writes the tables.
pub trait SchemaFacade {
    fn create_node(&self) -> Result<i64, EngineError>;
    fn add_node_label(&self, node_id: i64, label: &str) -> Result<(), EngineError>;
    fn remove_node_label(&self, node_id: i64, label: &str) -> Result<bool, EngineError>;
    fn set_node_property(
        &self,
        node_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError>;
    fn delete_node_property(&self, node_id: i64, key: &str) -> Result<bool, EngineError>;

    fn create_edge(&self, source_id: i64, target_id: i64, edge_type: &str)
        -> Result<i64, EngineError>;
    fn set_edge_property(
        &self,
        edge_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError>;
    fn delete_edge_property(&self, edge_id: i64, key: &str) -> Result<bool, EngineError>;

    /// Find a node carrying all listed labels and all literal properties.
    fn find_node_by_label_and_props(
        &self,
        labels: &[&str],
        props: &[(String, PropertyValue)],
    ) -> Result<Option<i64>, EngineError>;

    /// Find an edge by endpoints, optional type, and literal properties.
    fn find_edge(
        &self,
        source_id: i64,
        target_id: i64,
        edge_type: Option<&str>,
        props: &[(String, PropertyValue)],
    ) -> Result<Option<i64>, EngineError>;
}

/// SQLite-backed facade; borrows the engine's connection.
pub struct SqliteSchema<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchema<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        SqliteSchema { conn }
    }

    /// First-run DDL. Idempotent; executed on every open with Create set.
    pub fn initialize(conn: &Connection) -> Result<(), EngineError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS nodes (
                 id INTEGER PRIMARY KEY AUTOINCREMENT
             );
             CREATE TABLE IF NOT EXISTS edges (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 source_id INTEGER NOT NULL,
                 target_id INTEGER NOT NULL,
                 type TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS node_labels (
                 node_id INTEGER NOT NULL,
                 label TEXT NOT NULL,
                 PRIMARY KEY (node_id, label)
             );
             CREATE TABLE IF NOT EXISTS property_keys (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 key TEXT NOT NULL UNIQUE
             );
             CREATE TABLE IF NOT EXISTS node_props_text (
                 node_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value TEXT,
                 PRIMARY KEY (node_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS node_props_int (
                 node_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value INTEGER,
                 PRIMARY KEY (node_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS node_props_real (
                 node_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value REAL,
                 PRIMARY KEY (node_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS node_props_bool (
                 node_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value INTEGER,
                 PRIMARY KEY (node_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS edge_props_text (
                 edge_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value TEXT,
                 PRIMARY KEY (edge_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS edge_props_int (
                 edge_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value INTEGER,
                 PRIMARY KEY (edge_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS edge_props_real (
                 edge_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value REAL,
                 PRIMARY KEY (edge_id, key_id)
             );
             CREATE TABLE IF NOT EXISTS edge_props_bool (
                 edge_id INTEGER NOT NULL, key_id INTEGER NOT NULL, value INTEGER,
                 PRIMARY KEY (edge_id, key_id)
             );
             CREATE INDEX IF NOT EXISTS idx_edges_source ON edges (source_id);
             CREATE INDEX IF NOT EXISTS idx_edges_target ON edges (target_id);
             CREATE INDEX IF NOT EXISTS idx_node_labels_label ON node_labels (label);",
        )?;
        Ok(())
    }

    /// Insert-or-lookup for the shared property-key dictionary. The
    /// INSERT OR IGNORE keeps concurrent writers idempotent.
    pub fn property_key_id(&self, key: &str) -> Result<i64, EngineError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO property_keys (key) VALUES (?1)",
            params![key],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM property_keys WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn clear_property(&self, tables: &[&str; 4], id_column: &str, entity_id: i64, key_id: i64)
        -> Result<usize, EngineError> {
        let mut removed = 0;
        for table in tables {
            removed += self.conn.execute(
                &format!("DELETE FROM {} WHERE {} = ?1 AND key_id = ?2", table, id_column),
                params![entity_id, key_id],
            )?;
        }
        Ok(removed)
    }
}

impl SchemaFacade for SqliteSchema<'_> {
    fn create_node(&self) -> Result<i64, EngineError> {
        self.conn.execute("INSERT INTO nodes DEFAULT VALUES", [])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_node_label(&self, node_id: i64, label: &str) -> Result<(), EngineError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO node_labels (node_id, label) VALUES (?1, ?2)",
            params![node_id, label],
        )?;
        Ok(())
    }

    fn remove_node_label(&self, node_id: i64, label: &str) -> Result<bool, EngineError> {
        let removed = self.conn.execute(
            "DELETE FROM node_labels WHERE node_id = ?1 AND label = ?2",
            params![node_id, label],
        )?;
        Ok(removed > 0)
    }

    fn set_node_property(
        &self,
        node_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError> {
        let key_id = self.property_key_id(key)?;
        // A re-set may change the value's type; drop any previous row first.
        self.clear_property(&NODE_PROP_TABLES, "node_id", node_id, key_id)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (node_id, key_id, value) VALUES (?1, ?2, ?3)",
                node_props_table(value.property_type())
            ),
            params![node_id, key_id, value.to_sql_value()],
        )?;
        Ok(())
    }

    fn delete_node_property(&self, node_id: i64, key: &str) -> Result<bool, EngineError> {
        let key_id = self.property_key_id(key)?;
        Ok(self.clear_property(&NODE_PROP_TABLES, "node_id", node_id, key_id)? > 0)
    }

    fn create_edge(
        &self,
        source_id: i64,
        target_id: i64,
        edge_type: &str,
    ) -> Result<i64, EngineError> {
        self.conn.execute(
            "INSERT INTO edges (source_id, target_id, type) VALUES (?1, ?2, ?3)",
            params![source_id, target_id, edge_type],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn set_edge_property(
        &self,
        edge_id: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), EngineError> {
        let key_id = self.property_key_id(key)?;
        self.clear_property(&EDGE_PROP_TABLES, "edge_id", edge_id, key_id)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (edge_id, key_id, value) VALUES (?1, ?2, ?3)",
                edge_props_table(value.property_type())
            ),
            params![edge_id, key_id, value.to_sql_value()],
        )?;
        Ok(())
    }

    fn delete_edge_property(&self, edge_id: i64, key: &str) -> Result<bool, EngineError> {
        let key_id = self.property_key_id(key)?;
        Ok(self.clear_property(&EDGE_PROP_TABLES, "edge_id", edge_id, key_id)? > 0)
    }

    fn find_node_by_label_and_props(
        &self,
        labels: &[&str],
        props: &[(String, PropertyValue)],
    ) -> Result<Option<i64>, EngineError> {
        let mut sql = String::from("SELECT n.id FROM nodes n");
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        for (i, label) in labels.iter().enumerate() {
            sql.push_str(&format!(
                " JOIN node_labels nl{i} ON n.id = nl{i}.node_id AND nl{i}.label = ?{}",
                values.len() + 1,
                i = i
            ));
            values.push(rusqlite::types::Value::Text((*label).to_string()));
        }

        for (i, (key, value)) in props.iter().enumerate() {
            let table = node_props_table(value.property_type());
            sql.push_str(&format!(
                " JOIN {table} np{i} ON n.id = np{i}.node_id \
                 JOIN property_keys pk{i} ON np{i}.key_id = pk{i}.id \
                 AND pk{i}.key = ?{k} AND np{i}.value = ?{v}",
                table = table,
                i = i,
                k = values.len() + 1,
                v = values.len() + 2
            ));
            values.push(rusqlite::types::Value::Text(key.clone()));
            values.push(value.to_sql_value());
        }

        sql.push_str(" LIMIT 1");
        log::debug!("merge node find query: {}", sql);

        let found = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(found)
    }

    fn find_edge(
        &self,
        source_id: i64,
        target_id: i64,
        edge_type: Option<&str>,
        props: &[(String, PropertyValue)],
    ) -> Result<Option<i64>, EngineError> {
        let mut sql =
            String::from("SELECT e.id FROM edges e WHERE e.source_id = ?1 AND e.target_id = ?2");
        let mut values: Vec<rusqlite::types::Value> = vec![
            rusqlite::types::Value::Integer(source_id),
            rusqlite::types::Value::Integer(target_id),
        ];

        if let Some(ty) = edge_type {
            sql.push_str(&format!(" AND e.type = ?{}", values.len() + 1));
            values.push(rusqlite::types::Value::Text(ty.to_string()));
        }

        for (i, (key, value)) in props.iter().enumerate() {
            let table = edge_props_table(value.property_type());
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM {table} ep{i} \
                 JOIN property_keys pk{i} ON ep{i}.key_id = pk{i}.id \
                 WHERE ep{i}.edge_id = e.id AND pk{i}.key = ?{k} AND ep{i}.value = ?{v})",
                table = table,
                i = i,
                k = values.len() + 1,
                v = values.len() + 2
            ));
            values.push(rusqlite::types::Value::Text(key.clone()));
            values.push(value.to_sql_value());
        }

        sql.push_str(" LIMIT 1");
        log::debug!("merge edge find query: {}", sql);

        let found = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        SqliteSchema::initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_node_and_label() {
        let conn = open_test_db();
        let schema = SqliteSchema::new(&conn);

        let id = schema.create_node().unwrap();
        schema.add_node_label(id, "Person").unwrap();
        schema.add_node_label(id, "Person").unwrap(); // idempotent

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM node_labels WHERE node_id = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_property_key_dictionary_is_idempotent() {
        let conn = open_test_db();
        let schema = SqliteSchema::new(&conn);

        let a = schema.property_key_id("name").unwrap();
        let b = schema.property_key_id("name").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_property_replaces_across_types() {
        let conn = open_test_db();
        let schema = SqliteSchema::new(&conn);
        let id = schema.create_node().unwrap();

        schema
            .set_node_property(id, "age", &PropertyValue::Int(30))
            .unwrap();
        schema
            .set_node_property(id, "age", &PropertyValue::Text("thirty".into()))
            .unwrap();

        let int_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM node_props_int", [], |r| r.get(0))
            .unwrap();
        let text_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM node_props_text", [], |r| r.get(0))
            .unwrap();
        assert_eq!(int_count, 0);
        assert_eq!(text_count, 1);
    }

    #[test]
    fn test_find_node_by_label_and_props() {
        let conn = open_test_db();
        let schema = SqliteSchema::new(&conn);

        let id = schema.create_node().unwrap();
        schema.add_node_label(id, "Person").unwrap();
        schema
            .set_node_property(id, "email", &PropertyValue::Text("x@y".into()))
            .unwrap();

        let found = schema
            .find_node_by_label_and_props(
                &["Person"],
                &[("email".to_string(), PropertyValue::Text("x@y".into()))],
            )
            .unwrap();
        assert_eq!(found, Some(id));

        let missing = schema
            .find_node_by_label_and_props(
                &["Person"],
                &[("email".to_string(), PropertyValue::Text("other".into()))],
            )
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_find_edge() {
        let conn = open_test_db();
        let schema = SqliteSchema::new(&conn);

        let a = schema.create_node().unwrap();
        let b = schema.create_node().unwrap();
        let e = schema.create_edge(a, b, "KNOWS").unwrap();

        assert_eq!(schema.find_edge(a, b, Some("KNOWS"), &[]).unwrap(), Some(e));
        assert_eq!(schema.find_edge(a, b, Some("LIKES"), &[]).unwrap(), None);
        assert_eq!(schema.find_edge(b, a, None, &[]).unwrap(), None);
    }
}
