// Flow 模块 - 对话状态机

pub mod builder;
pub mod manager;
pub mod nodes;
pub mod transitions;
pub mod types;

// 重新导出核心类型
pub use builder::FlowBuilder;
pub use manager::{FlowManager, FlowPosition};
pub use nodes::{FlowNode, FunctionAction, FunctionDescriptor, FunctionSpec, PostAction};
pub use transitions::{
    transition_from_fn, DynTransitionController, StayController, TransitionContext,
    TransitionController, TransitionDecision,
};
pub use types::{
    event_channel, Flow, FlowEvent, FlowEventReceiver, FlowEventSender, NodeActivation,
};
