use serde_json::Value;

use super::error::{SchemaError, SchemaViolation};
use super::schema::{Schema, SchemaKind};

/// 验证值是否符合 Schema，返回第一个违反的约束
pub fn validate_value(schema: &Schema, value: &Value) -> Result<(), SchemaError> {
    validate_at(schema, value, &mut Vec::new())
}

fn validate_at(schema: &Schema, value: &Value, path: &mut Vec<String>) -> Result<(), SchemaError> {
    let matches = match &schema.kind {
        SchemaKind::Null => value.is_null(),
        SchemaKind::Boolean => value.is_boolean(),
        SchemaKind::Integer => value.is_i64() || value.is_u64(),
        SchemaKind::Number => value.is_number(),
        SchemaKind::String => value.is_string(),
        SchemaKind::Array { .. } => value.is_array(),
        SchemaKind::Object { .. } => value.is_object(),
        SchemaKind::Any => true,
    };
    if !matches {
        return Err(wrong_type(&schema.kind, value, path));
    }

    match &schema.kind {
        SchemaKind::Array { items } => {
            if let Some(array) = value.as_array() {
                for (idx, element) in array.iter().enumerate() {
                    path.push(idx.to_string());
                    validate_at(items, element, path)?;
                    path.pop();
                }
            }
        }
        SchemaKind::Object {
            properties,
            required,
            additional,
        } => {
            if let Some(object) = value.as_object() {
                for key in required {
                    if !object.contains_key(key) {
                        let mut required_path = path.clone();
                        required_path.push(key.clone());
                        return Err(SchemaError::Validation {
                            message: format!("missing required property `{key}`"),
                            path: required_path,
                            violation: SchemaViolation::MissingRequired,
                        });
                    }
                }

                for (key, val) in object {
                    if let Some(sub_schema) = properties.get(key) {
                        path.push(key.clone());
                        validate_at(sub_schema, val, path)?;
                        path.pop();
                    } else if !additional {
                        let mut extra_path = path.clone();
                        extra_path.push(key.clone());
                        return Err(SchemaError::Validation {
                            message: format!("unexpected property `{key}`"),
                            path: extra_path,
                            violation: SchemaViolation::UnexpectedProperty,
                        });
                    }
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn wrong_type(kind: &SchemaKind, value: &Value, path: &[String]) -> SchemaError {
    let expected = kind.type_name();
    let found = json_type(value);
    SchemaError::Validation {
        message: format!("expected {expected}, found {found}"),
        path: path.to_vec(),
        violation: SchemaViolation::WrongType { expected, found },
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
