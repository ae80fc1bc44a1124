use thiserror::Error;

use crate::schema::SchemaError;

pub type Result<T> = std::result::Result<T, IntakeFlowError>;

#[derive(Debug, Error)]
pub enum IntakeFlowError {
    #[error("unknown node `{0}` in flow")]
    UnknownNode(String),
    #[error("handler `{0}` not registered")]
    HandlerNotRegistered(String),
    #[error("invalid transition from `{from}` to `{to}`")]
    InvalidTransition { from: String, to: String },
    #[error("invalid flow: {0}")]
    InvalidFlow(String),
    #[error("missing session field `{0}`")]
    MissingField(String),
    #[error("calendar error: {0}")]
    Calendar(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for IntakeFlowError {
    fn from(error: serde_json::Error) -> Self {
        IntakeFlowError::Serialization(error.to_string())
    }
}
