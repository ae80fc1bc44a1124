use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::flow::{Flow, FlowBuilder, FlowNode, FunctionSpec, PostAction};
use crate::handlers::HandlerRegistry;
use crate::message::PromptMessage;
use crate::schema::Schema;

/// JSON 形式的 flow 配置
///
/// ```json
/// {
///   "initial_node": "start",
///   "initial_system_message": [{"role": "system", "content": "..."}],
///   "nodes": {
///     "start": {
///       "messages": [...],
///       "functions": [{"type": "function", "function": {
///         "name": "record_personal_details",
///         "handler": "record_personal_details",
///         "parameters": {"type": "object", "properties": {...}},
///         "transition_to": "get_prescriptions"
///       }}]
///     },
///     "end": {"messages": [...], "functions": [], "post_actions": [{"type": "end_conversation"}]}
///   }
/// }
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FlowConfig {
    #[serde(default = "FlowConfig::default_name")]
    pub name: String,
    pub initial_node: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_system_message: Vec<PromptMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_node: Option<String>,
    pub nodes: BTreeMap<String, NodeConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NodeConfig {
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_actions: Vec<PostAction>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionEntry {
    Function { function: FunctionConfig },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FunctionConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Schema::object")]
    pub parameters: Schema,
    /// 缺省时为声明式 function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_to: Option<String>,
}

impl FlowConfig {
    fn default_name() -> String {
        "flow".into()
    }

    /// 解析 handler 名称并构建校验过的 [`Flow`]
    pub fn build(&self, handlers: &HandlerRegistry) -> Result<Flow> {
        let mut builder = FlowBuilder::new(self.name.clone());
        builder.set_initial(&self.initial_node);
        if let Some(terminal) = &self.terminal_node {
            builder.set_terminal(terminal);
        }
        for message in &self.initial_system_message {
            builder.initial_message(message.clone());
        }

        for (name, node_config) in &self.nodes {
            let mut node = FlowNode::new(name.clone());
            node.messages = node_config.messages.clone();
            node.post_actions = node_config.post_actions.clone();
            for FunctionEntry::Function { function } in &node_config.functions {
                node.functions.push(function.to_spec(handlers)?);
            }
            builder.add_node(node);
        }

        builder.build()
    }
}

impl FunctionConfig {
    fn to_spec(&self, handlers: &HandlerRegistry) -> Result<FunctionSpec> {
        let mut spec =
            FunctionSpec::new(self.name.clone()).with_parameters(self.parameters.clone());
        if let Some(description) = &self.description {
            spec = spec.with_description(description.clone());
        }
        if let Some(handler) = &self.handler {
            spec = spec.with_handler(handlers.resolve(handler)?);
        }
        if let Some(target) = &self.transition_to {
            spec = spec.transition_to(target.clone());
        }
        Ok(spec)
    }
}

pub fn load_flow_from_value(value: Value, handlers: &HandlerRegistry) -> Result<Flow> {
    let config: FlowConfig = serde_json::from_value(value)?;
    config.build(handlers)
}

pub fn load_flow_from_str(content: &str, handlers: &HandlerRegistry) -> Result<Flow> {
    let config: FlowConfig = serde_json::from_str(content)?;
    config.build(handlers)
}

pub fn load_flow_from_path(path: impl AsRef<Path>, handlers: &HandlerRegistry) -> Result<Flow> {
    let content = std::fs::read_to_string(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "loading flow config");
    load_flow_from_str(&content, handlers)
}
