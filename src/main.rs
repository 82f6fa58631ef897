use checkout_strategies::config::SandboxConfig;
use checkout_strategies::interfaces::scenario::ScenarioRunner;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario CSV file (step,family,method,container)
    scenario: PathBuf,

    /// Sandbox configuration JSON. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => SandboxConfig::load(path).into_diagnostic()?,
        None => SandboxConfig::default(),
    };
    let runner = ScenarioRunner::new(&config).into_diagnostic()?;

    let file = File::open(cli.scenario).into_diagnostic()?;
    let stdout = io::stdout();
    runner.run(file, stdout.lock()).await.into_diagnostic()?;

    Ok(())
}
