use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use logharbor_core::config::LogharborConfig;
use logharbor_daemon::cli::DaemonCli;
use logharbor_daemon::logging::init_tracing;
use logharbor_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = DaemonCli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The subscriber may not be installed yet.
            eprintln!("logharbor-daemon: {:#}", e);
            tracing::error!(error = %format!("{:#}", e), "logharbor-daemon exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: DaemonCli) -> Result<()> {
    let mut config = LogharborConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load {}: {}", cli.config.display(), e))?;

    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    if let Some(pid_file) = cli.pid_file {
        config.general.pid_file = pid_file;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "logharbor-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config, Some(cli.config))?;
    orchestrator.run().await
}
