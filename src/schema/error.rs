use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// 违反的约束
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum SchemaViolation {
    MissingRequired,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    UnexpectedProperty,
}

/// Schema 错误类型
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("schema `{0}` not registered")]
    NotRegistered(String),
    #[error("schema validation failed at `{field}`: {message}", field = field_path(.path))]
    Validation {
        message: String,
        path: Vec<String>,
        violation: SchemaViolation,
    },
}

impl SchemaError {
    /// 出错字段的点分路径，根节点为空串
    pub fn field(&self) -> Option<String> {
        match self {
            SchemaError::Validation { path, .. } => Some(field_path(path)),
            SchemaError::NotRegistered(_) => None,
        }
    }

    pub fn violation(&self) -> Option<&SchemaViolation> {
        match self {
            SchemaError::Validation { violation, .. } => Some(violation),
            SchemaError::NotRegistered(_) => None,
        }
    }

    /// 供驱动方读取的结构化细节
    pub fn details(&self) -> Value {
        match self {
            SchemaError::Validation {
                path, violation, ..
            } => json!({
                "field": field_path(path),
                "violation": violation,
            }),
            SchemaError::NotRegistered(name) => json!({ "schema": name }),
        }
    }
}

fn field_path(path: &[String]) -> String {
    path.join(".")
}
