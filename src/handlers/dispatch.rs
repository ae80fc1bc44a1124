use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::flow::{FunctionAction, FunctionSpec};
use crate::state::SessionState;

use super::outcome::FunctionOutcome;

/// 调用已校验参数的 function
///
/// 声明式 function 直接成功；handler 的 `Err` 与 panic 被记录并转换为 `failure`。
pub async fn dispatch(
    function: &FunctionSpec,
    arguments: &Value,
    session: &mut SessionState,
) -> FunctionOutcome {
    let handler = match &function.action {
        FunctionAction::Declarative => {
            debug!(function = %function.name, "declarative function, nothing to run");
            return FunctionOutcome::success();
        }
        FunctionAction::Handler(handler) => handler,
    };

    let call = AssertUnwindSafe(handler.call(arguments, session)).catch_unwind();
    match call.await {
        Ok(Ok(outcome)) => {
            if let Some(message) = outcome.error() {
                warn!(function = %function.name, error = %message, "handler reported failure");
            }
            outcome
        }
        Ok(Err(err)) => {
            error!(function = %function.name, error = %err, "handler failed");
            FunctionOutcome::failure(err.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(function = %function.name, panic = %message, "handler panicked");
            FunctionOutcome::failure(format!("handler `{}` panicked: {message}", function.name))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
