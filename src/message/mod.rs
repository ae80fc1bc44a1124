use serde::{Deserialize, Serialize};

/// 提示消息，对引擎不透明，原样交给驱动方
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new<T: Into<String>>(role: MessageRole, content: T) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system<T: Into<String>>(content: T) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user<T: Into<String>>(content: T) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant<T: Into<String>>(content: T) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Tool,
}
