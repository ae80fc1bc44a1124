use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use intakeflow::config::EnvConfig;
use intakeflow::intake::{intake_handlers, patient_intake_flow, Calendar, MemoryCalendar};
use intakeflow::utils::LoggingConfig;
use intakeflow::{load_flow_from_path, Flow, NodeActivation};
use serde_json::json;

#[derive(Parser)]
#[command(name = "intakeflow", version, about = "Patient intake flow tooling", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the nodes, functions and transitions of a flow
    Describe {
        /// JSON flow config; the built-in intake flow when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Load a JSON flow config and report construction errors
    Validate { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Describe { config, compact } => handle_describe(config, compact)?,
        Command::Validate { path } => handle_validate(path)?,
    }
    Ok(())
}

/// 配置了日历标识时带上它，后端仍是内存日历
fn calendar() -> Arc<MemoryCalendar> {
    let calendar = match EnvConfig::calendar_id() {
        Some(id) => MemoryCalendar::new().with_id(id),
        None => MemoryCalendar::new(),
    };
    Arc::new(calendar)
}

fn load(config: Option<PathBuf>, calendar: Arc<MemoryCalendar>) -> anyhow::Result<Flow> {
    let handlers = intake_handlers(calendar);
    let flow = match config {
        Some(path) => load_flow_from_path(&path, &handlers)?,
        None => patient_intake_flow(&handlers)?,
    };
    Ok(flow)
}

fn handle_describe(config: Option<PathBuf>, compact: bool) -> anyhow::Result<()> {
    let calendar = calendar();
    let flow = load(config, Arc::clone(&calendar))?;
    let nodes: Vec<_> = flow
        .nodes
        .values()
        .map(|node| {
            let transitions: Vec<_> = node
                .functions
                .iter()
                .map(|f| json!({ "function": f.name, "transition_to": f.transition_to }))
                .collect();
            json!({
                "activation": NodeActivation::for_node(node),
                "transitions": transitions,
                "post_actions": node.post_actions,
                "terminal": node.is_terminal(),
            })
        })
        .collect();
    let value = json!({
        "name": flow.name,
        "calendar_id": calendar.calendar_id(),
        "initial_node": flow.initial_node,
        "terminal_node": flow.terminal().map(|node| node.name.clone()),
        "nodes": nodes,
    });

    let content = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{content}");
    Ok(())
}

fn handle_validate(path: PathBuf) -> anyhow::Result<()> {
    let flow = load(Some(path.clone()), calendar())?;
    println!(
        "`{}` is valid: flow `{}` with {} nodes, starting at `{}`",
        path.display(),
        flow.name,
        flow.nodes.len(),
        flow.initial_node
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intakeflow::config::env::CALENDAR_ID_ENV;

    #[test]
    fn describe_is_pretty_unless_compact() {
        let cli = Cli::try_parse_from(["intakeflow", "describe"]).unwrap();
        assert!(matches!(cli.command, Command::Describe { compact: false, .. }));

        let cli = Cli::try_parse_from(["intakeflow", "describe", "--compact"]).unwrap();
        assert!(matches!(cli.command, Command::Describe { compact: true, .. }));
    }

    #[test]
    fn configured_calendar_id_reaches_the_calendar() {
        std::env::set_var(CALENDAR_ID_ENV, "clinic@example.com");
        assert_eq!(calendar().calendar_id(), Some("clinic@example.com"));
        std::env::remove_var(CALENDAR_ID_ENV);
    }
}
