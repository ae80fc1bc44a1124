use std::io::Write;
use std::sync::Arc;

use serde_json::json;

use intakeflow::{
    event_channel, handler_fn, load_flow_from_path, load_flow_from_str, load_flow_from_value,
    FlowConfig, FlowEvent, FlowManager, FunctionOutcome, HandlerRegistry, IntakeFlowError,
    PostAction,
};

fn handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(
        "record_name",
        handler_fn(|args, session| {
            session.insert("name", args["name"].clone());
            Ok(FunctionOutcome::success())
        }),
    );
    registry
}

fn greeting_config() -> serde_json::Value {
    json!({
        "name": "greeting",
        "initial_node": "start",
        "initial_system_message": [{ "role": "system", "content": "You are a receptionist." }],
        "nodes": {
            "start": {
                "messages": [{ "role": "system", "content": "Ask for the user's name." }],
                "functions": [
                    {
                        "type": "function",
                        "function": {
                            "name": "record_name",
                            "handler": "record_name",
                            "description": "Record the user's name.",
                            "parameters": {
                                "type": "object",
                                "properties": { "name": { "type": "string" } },
                                "required": ["name"]
                            },
                            "transition_to": "goodbye"
                        }
                    }
                ]
            },
            "goodbye": {
                "messages": [{ "role": "system", "content": "Say goodbye." }],
                "functions": [],
                "post_actions": [{ "type": "end_conversation" }]
            }
        }
    })
}

#[test]
fn json_config_builds_a_flow() -> anyhow::Result<()> {
    let flow = load_flow_from_value(greeting_config(), &handlers())?;

    assert_eq!(flow.name, "greeting");
    assert_eq!(flow.initial_node, "start");
    assert_eq!(flow.initial_messages.len(), 1);
    assert_eq!(flow.nodes.len(), 2);
    assert_eq!(flow.terminal().map(|node| node.name.as_str()), Some("goodbye"));

    let start = flow.node("start").expect("start node");
    let record = start.function("record_name").expect("function declared");
    assert!(!record.is_declarative());
    assert_eq!(record.transition_to.as_deref(), Some("goodbye"));
    assert_eq!(
        flow.node("goodbye").expect("goodbye node").post_actions,
        vec![PostAction::EndConversation]
    );
    Ok(())
}

#[test]
fn config_round_trips_through_text() -> anyhow::Result<()> {
    let config: FlowConfig = serde_json::from_value(greeting_config())?;
    let text = serde_json::to_string(&config)?;
    let flow = load_flow_from_str(&text, &handlers())?;
    assert!(flow.contains("start"));
    assert!(flow.contains("goodbye"));
    Ok(())
}

#[test]
fn config_loads_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "{}", greeting_config())?;

    let flow = load_flow_from_path(file.path(), &handlers())?;
    assert_eq!(flow.name, "greeting");

    let missing = load_flow_from_path(file.path().with_extension("missing"), &handlers());
    assert!(matches!(missing, Err(IntakeFlowError::Io(_))));
    Ok(())
}

#[test]
fn unknown_handler_name_is_rejected() {
    let mut config = greeting_config();
    config["nodes"]["start"]["functions"][0]["function"]["handler"] = json!("record_nickname");

    let result = load_flow_from_value(config, &handlers());
    assert!(matches!(
        result,
        Err(IntakeFlowError::HandlerNotRegistered(ref name)) if name == "record_nickname"
    ));
}

#[test]
fn transition_to_unknown_node_is_rejected() {
    let mut config = greeting_config();
    config["nodes"]["start"]["functions"][0]["function"]["transition_to"] = json!("farewell");

    let result = load_flow_from_value(config, &handlers());
    assert!(matches!(
        result,
        Err(IntakeFlowError::InvalidTransition { ref to, .. }) if to == "farewell"
    ));
}

#[test]
fn missing_initial_node_is_rejected() {
    let mut config = greeting_config();
    config["initial_node"] = json!("welcome");

    let result = load_flow_from_value(config, &handlers());
    assert!(matches!(result, Err(IntakeFlowError::UnknownNode(ref name)) if name == "welcome"));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let result = load_flow_from_str("{ \"initial_node\": ", &handlers());
    assert!(matches!(result, Err(IntakeFlowError::Serialization(_))));
}

#[tokio::test]
async fn function_without_handler_is_declarative() -> anyhow::Result<()> {
    let mut config = greeting_config();
    config["nodes"]["start"]["functions"]
        .as_array_mut()
        .expect("functions array")
        .push(json!({
            "type": "function",
            "function": { "name": "say_hello", "description": "Greet the user." }
        }));

    let flow = Arc::new(load_flow_from_value(config, &handlers())?);
    let say_hello = flow
        .node("start")
        .and_then(|node| node.function("say_hello"))
        .expect("say_hello declared");
    assert!(say_hello.is_declarative());

    let (tx, mut rx) = event_channel();
    let mut manager = FlowManager::new(flow)?.with_event_sink(tx);

    let outcome = manager.handle_call("say_hello", serde_json::Value::Null).await;
    assert_eq!(outcome, FunctionOutcome::success());
    assert_eq!(manager.current_node(), Some("start"));

    let outcome = manager
        .handle_call("record_name", json!({ "name": "Ada" }))
        .await;
    assert!(outcome.is_success());
    assert_eq!(manager.session().get_str("name"), Some("Ada"));
    assert!(manager.is_terminated());

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(events.last(), Some(&FlowEvent::EndConversation));
    Ok(())
}
