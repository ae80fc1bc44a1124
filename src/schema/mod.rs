// Schema 模块 - function 参数校验

mod error;
mod schema;
mod validation;

use std::collections::HashMap;

use serde_json::Value;

pub use error::{SchemaError, SchemaViolation};
pub use schema::{Schema, SchemaKind};
pub use validation::validate_value;

/// Schema 注册表
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, schema: Schema) {
        self.schemas.insert(name.into(), schema);
    }

    pub fn snapshot(&self) -> Vec<(String, Schema)> {
        let mut entries: Vec<_> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn get(&self, name: &str) -> Result<&Schema, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::NotRegistered(name.to_string()))
    }

    pub fn validate(&self, name: &str, value: &Value) -> Result<(), SchemaError> {
        let schema = self.get(name)?;
        validate_value(schema, value)
    }
}
