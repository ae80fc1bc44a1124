use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handlers::DynFunctionHandler;
use crate::message::PromptMessage;
use crate::schema::Schema;

/// Flow 节点类型定义

/// Flow 节点
#[derive(Clone, Debug)]
pub struct FlowNode {
    pub name: String,
    pub messages: Vec<PromptMessage>,
    pub functions: Vec<FunctionSpec>,
    pub post_actions: Vec<PostAction>,
}

impl FlowNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
            functions: Vec::new(),
            post_actions: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: PromptMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_function(mut self, function: FunctionSpec) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_post_action(mut self, action: PostAction) -> Self {
        self.post_actions.push(action);
        self
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// 没有可调用 function 且带有后置动作的节点即终止节点，与节点名无关
    pub fn is_terminal(&self) -> bool {
        self.functions.is_empty() && !self.post_actions.is_empty()
    }

    pub fn descriptors(&self) -> Vec<FunctionDescriptor> {
        self.functions.iter().map(FunctionSpec::descriptor).collect()
    }
}

/// 节点激活后执行的动作
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostAction {
    EndConversation,
}

/// function 被调用时执行什么
#[derive(Clone)]
pub enum FunctionAction {
    Handler(DynFunctionHandler),
    /// 无副作用，总是成功
    Declarative,
}

/// 节点上可调用的 function
#[derive(Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Schema,
    pub action: FunctionAction,
    pub transition_to: Option<String>,
}

impl FunctionSpec {
    /// 声明式 function，参数为空对象
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Schema::object(),
            action: FunctionAction::Declarative,
            transition_to: None,
        }
    }

    pub fn with_handler(mut self, handler: DynFunctionHandler) -> Self {
        self.action = FunctionAction::Handler(handler);
        self
    }

    pub fn with_parameters(mut self, parameters: Schema) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn transition_to(mut self, node: impl Into<String>) -> Self {
        self.transition_to = Some(node.into());
        self
    }

    pub fn is_declarative(&self) -> bool {
        matches!(self.action, FunctionAction::Declarative)
    }

    pub fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("declarative", &self.is_declarative())
            .field("transition_to", &self.transition_to)
            .finish()
    }
}

/// 暴露给驱动方的 function 描述
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Schema,
}
