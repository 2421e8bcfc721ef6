pub use planboard_cli::cli;
pub use planboard_cli::commands;
pub use planboard_cli::config;
pub use planboard_cli::{init_tracing, AppConfig};

pub use planboard_client as client;
pub use planboard_core as core;
pub use planboard_core::model;
pub use planboard_engine as engine;
pub use planboard_engine::Planner;
