// Handler 模块 - function 注册与分发

mod dispatch;
mod handler;
mod outcome;
mod registry;

pub use dispatch::dispatch;
pub use handler::{handler_fn, DynFunctionHandler, FunctionHandler};
pub use outcome::{FailureKind, FunctionOutcome};
pub use registry::HandlerRegistry;
