use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{IntakeFlowError, Result};

/// 会话状态
///
/// 每个会话独占一份，由 [`FlowManager`](crate::flow::FlowManager) 持有并以
/// `&mut` 借给 handler。引擎本身不约束字段结构。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    fields: Map<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入字段，覆盖时返回旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// 按类型读取字段；字段缺失返回 `Ok(None)`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.fields.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| IntakeFlowError::Serialization(format!("field `{key}`: {e}"))),
            None => Ok(None),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| IntakeFlowError::MissingField(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn snapshot(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_overwrites_and_returns_previous() {
        let mut session = SessionState::new();
        assert_eq!(session.insert("name", "John Doe"), None);
        assert_eq!(
            session.insert("name", "Jane Doe"),
            Some(json!("John Doe"))
        );
        assert_eq!(session.get_str("name"), Some("Jane Doe"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn get_as_reports_shape_mismatch() {
        let mut session = SessionState::new();
        session.insert("allergies", json!("none"));
        assert!(session.get_as::<Vec<String>>("allergies").is_err());
        assert_eq!(session.get_as::<Vec<String>>("missing").unwrap(), None);
    }

    #[test]
    fn require_str_names_missing_field() {
        let session = SessionState::new();
        let err = session.require_str("visit_date").unwrap_err();
        assert!(matches!(err, IntakeFlowError::MissingField(field) if field == "visit_date"));
    }
}
