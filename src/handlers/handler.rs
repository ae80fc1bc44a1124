use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::state::SessionState;

use super::outcome::FunctionOutcome;

/// function handler
///
/// `Err` 与 panic 都会在分发边界被转换成 `failure`，不会终止会话。
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    async fn call(&self, arguments: &Value, session: &mut SessionState)
        -> Result<FunctionOutcome>;
}

pub type DynFunctionHandler = Arc<dyn FunctionHandler>;

struct FnHandler<F> {
    func: F,
}

#[async_trait]
impl<F> FunctionHandler for FnHandler<F>
where
    F: Fn(&Value, &mut SessionState) -> Result<FunctionOutcome> + Send + Sync,
{
    async fn call(
        &self,
        arguments: &Value,
        session: &mut SessionState,
    ) -> Result<FunctionOutcome> {
        (self.func)(arguments, session)
    }
}

/// 从同步闭包创建 handler
pub fn handler_fn<F>(func: F) -> DynFunctionHandler
where
    F: Fn(&Value, &mut SessionState) -> Result<FunctionOutcome> + Send + Sync + 'static,
{
    Arc::new(FnHandler { func })
}
