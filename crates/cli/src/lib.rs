pub mod cli;
pub mod commands;
pub mod config;
mod render;

use anyhow::Result;
use tracing_subscriber::filter::{Directive, EnvFilter};

pub use planboard_core as core;
pub use planboard_core::AppConfig;
pub use planboard_engine::Planner;

/// Install the stderr subscriber. `RUST_LOG` still wins over the default directive.
pub fn init_tracing(filter: Option<String>) -> Result<()> {
    let filter = filter.unwrap_or_else(|| "warn".to_string());
    let directive: Directive = filter.parse()?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
