use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::flow::nodes::{FunctionDescriptor, PostAction};
use crate::flow::transitions::{
    DynTransitionController, StayController, TransitionContext, TransitionDecision,
};
use crate::flow::types::{Flow, FlowEvent, FlowEventSender, NodeActivation};
use crate::handlers::{dispatch, FailureKind, FunctionOutcome};
use crate::schema::validate_value;
use crate::state::SessionState;

const CONTROLLER_SOURCE: &str = "<transition controller>";

/// 会话在图中的位置
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowPosition {
    Node(String),
    Terminated,
}

/// Flow 管理器
///
/// 每个会话一个实例。`handle_call` 需要 `&mut self`，同一会话的调用因此
/// 严格串行；不同会话之间只共享只读的 [`Flow`]。
pub struct FlowManager {
    flow: Arc<Flow>,
    position: FlowPosition,
    session: SessionState,
    controller: DynTransitionController,
    /// 控制器声明的 `Go` 目标，运行时只接受其中的节点
    targets: HashSet<String>,
    events: Option<FlowEventSender>,
    initialized: bool,
}

impl FlowManager {
    pub fn new(flow: Arc<Flow>) -> Result<Self> {
        flow.validate()?;
        let initial = flow.initial_node.clone();
        Ok(Self {
            flow,
            position: FlowPosition::Node(initial),
            session: SessionState::new(),
            controller: Arc::new(StayController),
            targets: HashSet::new(),
            events: None,
            initialized: false,
        })
    }

    /// 替换转换控制器，并校验它声明的全部目标节点
    pub fn with_transition_controller(
        mut self,
        controller: DynTransitionController,
    ) -> Result<Self> {
        let targets: HashSet<String> = controller.targets().into_iter().collect();
        for target in &targets {
            self.flow.check_target(CONTROLLER_SOURCE, target)?;
        }
        self.controller = controller;
        self.targets = targets;
        Ok(self)
    }

    pub fn with_event_sink(mut self, events: FlowEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn position(&self) -> &FlowPosition {
        &self.position
    }

    pub fn current_node(&self) -> Option<&str> {
        match &self.position {
            FlowPosition::Node(name) => Some(name.as_str()),
            FlowPosition::Terminated => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.position == FlowPosition::Terminated
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn into_session(self) -> SessionState {
        self.session
    }

    /// 当前节点可调用的 function；会话结束后为空
    pub fn available_functions(&self) -> Vec<FunctionDescriptor> {
        self.current_node()
            .and_then(|name| self.flow.node(name))
            .map(|node| node.descriptors())
            .unwrap_or_default()
    }

    /// 当前动作面
    pub fn activation(&self) -> Option<NodeActivation> {
        self.current_node()
            .and_then(|name| self.flow.node(name))
            .map(NodeActivation::for_node)
    }

    /// 激活初始节点，消息前附加 flow 的初始系统消息
    ///
    /// 只在会话开始时生效：已初始化或已处理过调用时不移动位置。
    pub fn initialize(&mut self) {
        if self.initialized {
            warn!(flow = %self.flow.name, "flow manager already initialized or in use");
            return;
        }
        self.initialized = true;
        let initial = self.flow.initial_node.clone();
        info!(flow = %self.flow.name, node = %initial, "flow initialized");
        self.enter_node(&initial, true);
    }

    /// 处理驱动方发来的 function 调用
    ///
    /// 未知 function、参数不合法、handler 失败都只返回 `failure`，节点不变。
    pub async fn handle_call(&mut self, function_name: &str, arguments: Value) -> FunctionOutcome {
        self.initialized = true;
        let current = match &self.position {
            FlowPosition::Node(name) => name.clone(),
            FlowPosition::Terminated => {
                warn!(function = %function_name, "call after conversation ended");
                return FunctionOutcome::failure_of(
                    FailureKind::ConversationEnded,
                    "conversation has ended",
                );
            }
        };

        let flow = Arc::clone(&self.flow);
        let Some(node) = flow.node(&current) else {
            error!(node = %current, "active node missing from flow");
            return FunctionOutcome::failure(format!("node `{current}` is not part of the flow"));
        };

        let Some(function) = node.function(function_name) else {
            warn!(
                node = %current,
                function = %function_name,
                "function not available in active node"
            );
            let available: Vec<&str> = node.functions.iter().map(|f| f.name.as_str()).collect();
            return FunctionOutcome::failure_of(
                FailureKind::UnknownFunction,
                format!("function `{function_name}` is not available in node `{current}`"),
            )
            .with_details(json!({ "node": current, "available": available }));
        };

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        if let Err(err) = validate_value(&function.parameters, &arguments) {
            warn!(node = %current, function = %function_name, error = %err, "arguments rejected");
            return FunctionOutcome::failure_of(FailureKind::InvalidArguments, err.to_string())
                .with_details(err.details());
        }

        debug!(node = %current, function = %function_name, "dispatching");
        let outcome = dispatch(function, &arguments, &mut self.session).await;
        if !outcome.is_success() {
            return outcome;
        }

        match &function.transition_to {
            Some(target) => {
                debug!(from = %current, to = %target, "static transition");
                self.enter_node(target, false);
            }
            None => {
                let decision = self.controller.decide(&TransitionContext {
                    function_name,
                    arguments: &arguments,
                    outcome: &outcome,
                    current_node: &current,
                });
                self.apply_decision(&current, decision);
            }
        }

        outcome
    }

    fn apply_decision(&mut self, current: &str, decision: TransitionDecision) {
        match decision {
            TransitionDecision::Stay => {
                debug!(node = %current, "staying in node");
            }
            TransitionDecision::Go(target) => {
                if self.targets.contains(&target) {
                    debug!(from = %current, to = %target, "controller transition");
                    self.enter_node(&target, false);
                } else {
                    error!(
                        from = %current,
                        to = %target,
                        "controller named an undeclared node, staying"
                    );
                }
            }
            TransitionDecision::Terminate => {
                info!(node = %current, "controller requested termination");
                self.terminate();
            }
        }
    }

    /// 进入终止节点；没有终止节点时直接结束对话
    fn terminate(&mut self) {
        let terminal = self.flow.terminal().map(|node| node.name.clone());
        match terminal {
            Some(name) => self.enter_node(&name, false),
            None => self.end_conversation(),
        }
    }

    fn enter_node(&mut self, name: &str, initial: bool) {
        let flow = Arc::clone(&self.flow);
        let Some(node) = flow.node(name) else {
            error!(node = %name, "transition to unknown node ignored");
            return;
        };

        info!(node = %name, "node activated");
        self.position = FlowPosition::Node(name.to_string());

        let mut activation = NodeActivation::for_node(node);
        if initial && !flow.initial_messages.is_empty() {
            let mut messages = flow.initial_messages.clone();
            messages.append(&mut activation.messages);
            activation.messages = messages;
        }
        self.emit(FlowEvent::NodeActivated(activation));

        for action in &node.post_actions {
            match action {
                PostAction::EndConversation => self.end_conversation(),
            }
        }
    }

    fn end_conversation(&mut self) {
        if self.is_terminated() {
            return;
        }
        info!(flow = %self.flow.name, "conversation ended");
        self.position = FlowPosition::Terminated;
        self.emit(FlowEvent::EndConversation);
    }

    fn emit(&self, event: FlowEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!("event receiver dropped");
            }
        }
    }
}
