pub mod env;
pub mod flow_config;

pub use env::EnvConfig;
pub use flow_config::{
    load_flow_from_path, load_flow_from_str, load_flow_from_value, FlowConfig, FunctionConfig,
    FunctionEntry, NodeConfig,
};
