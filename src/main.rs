use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

fn main() -> Result<()> {
    let cli = planboard::cli::Cli::parse();
    planboard::init_tracing(cli.log_filter.clone())?;

    let config = planboard::config::from_cli(&cli)?;
    let mut planner = planboard::Planner::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let today = Local::now().date_naive();
    runtime.block_on(planboard::commands::execute(
        &mut planner,
        cli.command,
        today,
        stdin.lock(),
        stdout.lock(),
    ))
}
