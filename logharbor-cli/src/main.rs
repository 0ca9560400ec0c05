use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use logharbor_cli::cli::{Cli, Commands};
use logharbor_cli::commands;
use logharbor_cli::error::CliError;
use logharbor_cli::output::OutputWriter;
use logharbor_core::config::LogharborConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable with --output json.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(cli.log_level.as_deref().unwrap_or("warn").to_lowercase())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            use colored::Colorize;
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // `config` works without a loadable file; every other command needs one.
    let command = match cli.command {
        Commands::Config(args) => return commands::config::execute(args, &cli.config, &writer).await,
        other => other,
    };

    let config = LogharborConfig::load(&cli.config).await?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match command {
        Commands::Live(args) => commands::live::execute(args, &config, &writer).await,
        Commands::Search(args) => commands::search::execute(args, &config, &writer).await,
        Commands::Rotate(args) => commands::rotate::execute(args, &config, &writer).await,
        Commands::Files => commands::files::execute(&config, &writer).await,
        Commands::Status => commands::status::execute(&config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
