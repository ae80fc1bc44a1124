use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema 类型枚举
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SchemaKind {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "array")]
    Array {
        #[serde(default = "Schema::any_items")]
        items: Box<Schema>,
    },
    #[serde(rename = "object")]
    Object {
        #[serde(default)]
        properties: BTreeMap<String, Schema>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
        #[serde(
            default = "Schema::allow_additional",
            rename = "additionalProperties"
        )]
        additional: bool,
    },
    #[serde(rename = "any")]
    Any,
}

impl SchemaKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::String => "string",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Any => "any",
        }
    }
}

/// Schema 定义
///
/// 序列化形式与 function calling 的 `parameters` 字段一致：
/// `{"type": "object", "properties": {...}, "required": [...]}`。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(flatten)]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    /// 空对象，允许额外属性
    pub fn object() -> Self {
        Self::new(SchemaKind::Object {
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional: true,
        })
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array {
            items: Box::new(items),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 添加属性；非对象 schema 保持不变
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let SchemaKind::Object { properties, .. } = &mut self.kind {
            properties.insert(name.into(), schema);
        }
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        if let SchemaKind::Object { required, .. } = &mut self.kind {
            required.push(name.into());
        }
        self
    }

    pub fn deny_additional(mut self) -> Self {
        if let SchemaKind::Object { additional, .. } = &mut self.kind {
            *additional = false;
        }
        self
    }

    fn allow_additional() -> bool {
        true
    }

    fn any_items() -> Box<Schema> {
        Box::new(Schema::new(SchemaKind::Any))
    }
}
