use std::sync::Arc;

use serde_json::Value;

use crate::handlers::FunctionOutcome;

/// 没有静态 `transition_to` 时的去向
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionDecision {
    Stay,
    Go(String),
    Terminate,
}

/// 一次成功调用的上下文
#[derive(Clone, Copy, Debug)]
pub struct TransitionContext<'a> {
    pub function_name: &'a str,
    pub arguments: &'a Value,
    pub outcome: &'a FunctionOutcome,
    pub current_node: &'a str,
}

/// 依赖运行时数据的转换逻辑
///
/// 只在 function 没有静态 `transition_to` 时调用。
pub trait TransitionController: Send + Sync {
    fn decide(&self, ctx: &TransitionContext<'_>) -> TransitionDecision;

    /// `decide` 可能返回的全部 `Go` 目标，构造 FlowManager 时逐一校验
    fn targets(&self) -> Vec<String> {
        Vec::new()
    }
}

pub type DynTransitionController = Arc<dyn TransitionController>;

/// 默认：留在当前节点
#[derive(Clone, Copy, Debug, Default)]
pub struct StayController;

impl TransitionController for StayController {
    fn decide(&self, _ctx: &TransitionContext<'_>) -> TransitionDecision {
        TransitionDecision::Stay
    }
}

struct FnController<F> {
    func: F,
    targets: Vec<String>,
}

impl<F> TransitionController for FnController<F>
where
    F: Fn(&TransitionContext<'_>) -> TransitionDecision + Send + Sync,
{
    fn decide(&self, ctx: &TransitionContext<'_>) -> TransitionDecision {
        (self.func)(ctx)
    }

    fn targets(&self) -> Vec<String> {
        self.targets.clone()
    }
}

/// 从函数创建转换控制器，`targets` 列出它可能跳转的节点
pub fn transition_from_fn<F, I, S>(targets: I, func: F) -> DynTransitionController
where
    F: Fn(&TransitionContext<'_>) -> TransitionDecision + Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(FnController {
        func,
        targets: targets.into_iter().map(Into::into).collect(),
    })
}
