use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 失败类别
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 当前节点没有该 function
    UnknownFunction,
    /// 参数未通过 schema 校验
    InvalidArguments,
    /// handler 返回错误、业务失败或 panic
    #[default]
    Handler,
    /// 会话已结束
    ConversationEnded,
}

/// function 调用结果
///
/// 序列化为 `{"status": "success", ...payload}` 或
/// `{"status": "failure", "error": "..."}`。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FunctionOutcome {
    Success {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    Failure {
        error: String,
        #[serde(default)]
        kind: FailureKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl FunctionOutcome {
    pub fn success() -> Self {
        FunctionOutcome::Success {
            payload: Map::new(),
        }
    }

    /// 对象的字段并入 payload（`status` 除外），其它值放在 `result` 下
    pub fn success_with(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(mut map) => {
                map.remove("status");
                map
            }
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        FunctionOutcome::Success { payload }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::failure_of(FailureKind::Handler, error)
    }

    pub fn failure_of(kind: FailureKind, error: impl Into<String>) -> Self {
        FunctionOutcome::Failure {
            error: error.into(),
            kind,
            details: None,
        }
    }

    pub fn with_details(mut self, value: Value) -> Self {
        if let FunctionOutcome::Failure { details, .. } = &mut self {
            *details = Some(value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FunctionOutcome::Success { .. })
    }

    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            FunctionOutcome::Success { payload } => Some(payload),
            FunctionOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FunctionOutcome::Failure { error, .. } => Some(error),
            FunctionOutcome::Success { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            FunctionOutcome::Failure { kind, .. } => Some(*kind),
            FunctionOutcome::Success { .. } => None,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            FunctionOutcome::Failure { details, .. } => details.as_ref(),
            FunctionOutcome::Success { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "status": "failure", "error": e.to_string() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_payload_beside_status() {
        let outcome = FunctionOutcome::success_with(json!({
            "status": "ignored",
            "departments": ["Dentiste"]
        }));
        assert_eq!(
            outcome.to_value(),
            json!({ "status": "success", "departments": ["Dentiste"] })
        );
    }

    #[test]
    fn failure_carries_kind_and_details() {
        let outcome = FunctionOutcome::failure_of(FailureKind::InvalidArguments, "bad")
            .with_details(json!({ "field": "name" }));
        assert_eq!(
            outcome.to_value(),
            json!({
                "status": "failure",
                "error": "bad",
                "kind": "invalid_arguments",
                "details": { "field": "name" }
            })
        );
    }
}
