use serde_json::Value;
use tracing::info;

use crate::flow::{TransitionContext, TransitionController, TransitionDecision};

use super::handlers::DEPARTMENTS;

pub const DEPARTMENTS_FUNCTION: &str = "get_departments";

/// 科室检查
///
/// `get_departments` 带上的 `department` 不在中心科室列表中时结束对话，
/// 其余情况留在当前节点继续收集信息。
#[derive(Clone, Debug)]
pub struct DepartmentGate {
    departments: Vec<String>,
}

impl DepartmentGate {
    pub fn new<I, S>(departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            departments: departments.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for DepartmentGate {
    fn default() -> Self {
        Self::new(DEPARTMENTS)
    }
}

impl TransitionController for DepartmentGate {
    fn decide(&self, ctx: &TransitionContext<'_>) -> TransitionDecision {
        if ctx.function_name != DEPARTMENTS_FUNCTION {
            return TransitionDecision::Stay;
        }
        match ctx.arguments.get("department").and_then(Value::as_str) {
            Some(department) if !self.departments.iter().any(|d| d == department) => {
                info!(department = %department, node = %ctx.current_node, "department not offered");
                TransitionDecision::Terminate
            }
            _ => TransitionDecision::Stay,
        }
    }
}
