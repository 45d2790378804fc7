//! CLI entry point - the composition root.
//!
//! Loads configuration, installs logging, wires adapters via bootstrap and
//! dispatches to command handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use seeforme_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Listing languages needs no configuration at all
    if matches!(command, Commands::Languages) {
        handlers::languages::execute();
        return Ok(());
    }

    let config = match CliConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    let ctx = bootstrap(&config)?;

    match command {
        Commands::Run => handlers::run::execute(&ctx).await?,
        Commands::Describe {
            image,
            question,
            speak,
        } => handlers::describe::execute(&ctx, &image, question.as_deref(), speak).await?,
        Commands::Voices => handlers::voices::execute(&ctx).await?,
        Commands::Languages => handlers::languages::execute(),
    }

    Ok(())
}

fn exit_with(error: &CliError) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(error.exit_code());
}
