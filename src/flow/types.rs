use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{IntakeFlowError, Result};
use crate::flow::nodes::{FlowNode, FunctionDescriptor};
use crate::message::PromptMessage;

/// Flow 图
///
/// 通过 [`Flow::validate`] 的图满足：初始节点存在，每个 `transition_to`
/// 指向已有节点，终止节点（若有）确实是终止节点。
#[derive(Clone, Debug)]
pub struct Flow {
    pub name: String,
    pub initial_node: String,
    /// 首次激活时排在初始节点消息之前
    pub initial_messages: Vec<PromptMessage>,
    pub nodes: BTreeMap<String, FlowNode>,
    pub terminal_node: Option<String>,
}

impl Flow {
    pub fn node(&self, name: &str) -> Option<&FlowNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// 显式声明的终止节点，否则唯一的终止节点
    pub fn terminal(&self) -> Option<&FlowNode> {
        if let Some(name) = &self.terminal_node {
            return self.nodes.get(name);
        }
        let mut terminals = self.nodes.values().filter(|node| node.is_terminal());
        match (terminals.next(), terminals.next()) {
            (Some(node), None) => Some(node),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.nodes.contains_key(&self.initial_node) {
            return Err(IntakeFlowError::UnknownNode(self.initial_node.clone()));
        }

        for (key, node) in &self.nodes {
            if key != &node.name {
                return Err(IntakeFlowError::InvalidFlow(format!(
                    "node registered as `{key}` is named `{}`",
                    node.name
                )));
            }
            if node.functions.is_empty() && node.post_actions.is_empty() {
                return Err(IntakeFlowError::InvalidFlow(format!(
                    "node `{key}` has neither functions nor post actions"
                )));
            }

            let mut seen = HashSet::new();
            for function in &node.functions {
                if !seen.insert(function.name.as_str()) {
                    return Err(IntakeFlowError::InvalidFlow(format!(
                        "function `{}` declared twice in node `{key}`",
                        function.name
                    )));
                }
                if let Some(target) = &function.transition_to {
                    self.check_target(key, target)?;
                }
            }
        }

        if let Some(name) = &self.terminal_node {
            let node = self
                .nodes
                .get(name)
                .ok_or_else(|| IntakeFlowError::UnknownNode(name.clone()))?;
            if !node.is_terminal() {
                return Err(IntakeFlowError::InvalidFlow(format!(
                    "terminal node `{name}` must have no functions and at least one post action"
                )));
            }
        }

        Ok(())
    }

    pub fn check_target(&self, from: &str, to: &str) -> Result<()> {
        if self.nodes.contains_key(to) {
            Ok(())
        } else {
            Err(IntakeFlowError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

/// 节点激活时交给驱动方的新动作面
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NodeActivation {
    pub node: String,
    pub messages: Vec<PromptMessage>,
    pub functions: Vec<FunctionDescriptor>,
}

impl NodeActivation {
    pub fn for_node(node: &FlowNode) -> Self {
        Self {
            node: node.name.clone(),
            messages: node.messages.clone(),
            functions: node.descriptors(),
        }
    }
}

/// 发给外层会话的事件
#[derive(Clone, Debug, PartialEq)]
pub enum FlowEvent {
    NodeActivated(NodeActivation),
    /// 通知传输层结束对话
    EndConversation,
}

pub type FlowEventSender = tokio::sync::mpsc::UnboundedSender<FlowEvent>;
pub type FlowEventReceiver = tokio::sync::mpsc::UnboundedReceiver<FlowEvent>;

/// 创建事件通道
pub fn event_channel() -> (FlowEventSender, FlowEventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
