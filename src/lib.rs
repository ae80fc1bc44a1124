pub mod config;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod intake;
pub mod message;
pub mod schema;
pub mod state;
pub mod utils;

pub use config::{load_flow_from_path, load_flow_from_str, load_flow_from_value, FlowConfig};
pub use error::{IntakeFlowError, Result};
pub use flow::{
    event_channel, transition_from_fn, Flow, FlowBuilder, FlowEvent, FlowEventReceiver,
    FlowEventSender, FlowManager, FlowNode, FlowPosition, FunctionAction, FunctionDescriptor,
    FunctionSpec, NodeActivation, PostAction, StayController, TransitionContext,
    TransitionController, TransitionDecision,
};
pub use handlers::{
    dispatch, handler_fn, DynFunctionHandler, FailureKind, FunctionHandler, FunctionOutcome,
    HandlerRegistry,
};
pub use message::{MessageRole, PromptMessage};
pub use schema::{
    validate_value, Schema, SchemaError, SchemaKind, SchemaRegistry, SchemaViolation,
};
pub use state::SessionState;
pub use utils::logging;
