use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{IntakeFlowError, Result};
use crate::flow::nodes::FlowNode;
use crate::flow::types::Flow;
use crate::message::PromptMessage;

/// Flow 构建器
pub struct FlowBuilder {
    name: String,
    initial: Option<String>,
    initial_messages: Vec<PromptMessage>,
    nodes: BTreeMap<String, FlowNode>,
    terminal: Option<String>,
}

impl FlowBuilder {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            initial: None,
            initial_messages: Vec::new(),
            nodes: BTreeMap::new(),
            terminal: None,
        }
    }

    pub fn add_node(&mut self, node: FlowNode) -> &mut Self {
        if self.nodes.contains_key(&node.name) {
            warn!(node = %node.name, "node redefined, keeping the last definition");
        }
        self.nodes.insert(node.name.clone(), node);
        self
    }

    pub fn set_initial(&mut self, name: &str) -> &mut Self {
        self.initial = Some(name.to_string());
        self
    }

    pub fn set_terminal(&mut self, name: &str) -> &mut Self {
        self.terminal = Some(name.to_string());
        self
    }

    pub fn initial_message(&mut self, message: PromptMessage) -> &mut Self {
        self.initial_messages.push(message);
        self
    }

    /// 构建并校验；图配置错误在这里暴露，不会留到运行时
    pub fn build(&self) -> Result<Flow> {
        let initial = self.initial.clone().ok_or_else(|| {
            IntakeFlowError::InvalidFlow(format!("flow `{}` has no initial node", self.name))
        })?;
        let flow = Flow {
            name: self.name.clone(),
            initial_node: initial,
            initial_messages: self.initial_messages.clone(),
            nodes: self.nodes.clone(),
            terminal_node: self.terminal.clone(),
        };
        flow.validate()?;
        Ok(flow)
    }
}
