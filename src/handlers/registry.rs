use std::collections::HashMap;

use crate::error::{IntakeFlowError, Result};

use super::handler::DynFunctionHandler;

/// handler 注册表，JSON 流程配置按名字解析 handler
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, DynFunctionHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: DynFunctionHandler) -> &mut Self {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::warn!(handler = %name, "handler replaced");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<DynFunctionHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<DynFunctionHandler> {
        self.get(name)
            .ok_or_else(|| IntakeFlowError::HandlerNotRegistered(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
