use rusqlite::Statement;
use serde_json::Value;

use crate::error::EngineError;
use crate::schema::PropertyValue;

/// Parsed `{"name": value, ...}` parameter object. Query placeholders use
/// `$name`; the generated SQL carries `:name`, which is what binding
/// resolves against.
#[derive(Debug, Default, Clone)]
pub struct ParamStore {
    map: serde_json::Map<String, Value>,
}

impl ParamStore {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let parsed: Value = serde_json::from_str(text)
            .map_err(|e| EngineError::InvalidParameter(format!("malformed JSON: {}", e)))?;
        match parsed {
            Value::Object(map) => Ok(ParamStore { map }),
            _ => Err(EngineError::InvalidParameter(
                "parameters must be a JSON object".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Bind every key whose `:name` placeholder occurs in the statement.
    /// Keys the query does not reference are silently skipped.
    pub fn bind(&self, stmt: &mut Statement<'_>) -> Result<(), EngineError> {
        for (key, value) in &self.map {
            let placeholder = format!(":{}", key);
            let Some(index) = stmt.parameter_index(&placeholder)? else {
                continue;
            };
            match value {
                Value::Null => stmt.raw_bind_parameter(index, rusqlite::types::Null)?,
                Value::Bool(b) => stmt.raw_bind_parameter(index, *b as i64)?,
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        stmt.raw_bind_parameter(index, i)?;
                    } else {
                        stmt.raw_bind_parameter(index, n.as_f64().unwrap_or(0.0))?;
                    }
                }
                Value::String(s) => stmt.raw_bind_parameter(index, s.as_str())?,
                // Arrays and objects bind as their JSON text.
                nested => stmt.raw_bind_parameter(index, nested.to_string())?,
            }
        }
        Ok(())
    }

    /// Resolve a parameter to a typed property value for the write
    /// executors. `Ok(None)` means the parameter is JSON null (the property
    /// is skipped); an absent key is an error.
    pub fn property_value(&self, name: &str) -> Result<Option<PropertyValue>, EngineError> {
        let value = self.map.get(name).ok_or_else(|| {
            EngineError::InvalidParameter(format!("parameter '{}' not supplied", name))
        })?;
        Ok(match value {
            Value::Null => None,
            Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(PropertyValue::Int(i))
                } else {
                    Some(PropertyValue::Real(n.as_f64().unwrap_or(0.0)))
                }
            }
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            nested => Some(PropertyValue::Text(nested.to_string())),
        })
    }
}
