use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qagrep::cli::{Cli, CliApp, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "qagrep=debug" } else { "qagrep=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let app = CliApp::new(cli.taxonomy.as_deref(), cli.verbose)?;
    match &cli.command {
        Command::Match(args) => app.run_match(args),
        Command::Patterns(args) => app.run_patterns(args),
    }
}
