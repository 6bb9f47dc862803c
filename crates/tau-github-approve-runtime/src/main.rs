use anyhow::{Context, Result};
use clap::Parser;
use tau_github_approve_runtime::{run_github_approve, ApproveCli};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = ApproveCli::parse();
    let command = cli.run_command()?;
    let outcome = run_github_approve(cli.runtime_config(), command).await?;
    let line = serde_json::to_string(&outcome).context("failed to render approve outcome")?;
    println!("{line}");
    Ok(())
}
