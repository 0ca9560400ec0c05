//! Daemon orchestration: configuration, worker lifecycle and signal handling.
//!
//! The [`Orchestrator`] owns the loaded configuration and the running
//! [`Workers`]. Its main loop reacts to three signals:
//!
//! | Signal  | Action                                     |
//! |---------|--------------------------------------------|
//! | SIGTERM | graceful shutdown                          |
//! | SIGINT  | graceful shutdown                          |
//! | SIGHUP  | reload config, restart tailer watch        |
//!
//! SIGHUP is also what `logharbor rotate` sends after an out-of-process
//! rotation, so a reload always ends with a tailer restart even when the
//! configuration file is unchanged or invalid.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use tokio::signal::unix::{Signal, SignalKind, signal};

use logharbor_core::config::LogharborConfig;
use logharbor_core::metrics as m;

use crate::metrics_server;
use crate::pid_file::{remove_pid_file, write_pid_file};
use crate::workers::Workers;

/// Outcome of waiting on the signal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaemonSignal {
    Shutdown(&'static str),
    Reload,
}

/// Installed signal streams.
struct Signals {
    term: Signal,
    int: Signal,
    hup: Signal,
}

impl Signals {
    fn install() -> Result<Self> {
        let install = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|e| anyhow::anyhow!("failed to install {} handler: {}", name, e))
        };
        Ok(Self {
            term: install(SignalKind::terminate(), "SIGTERM")?,
            int: install(SignalKind::interrupt(), "SIGINT")?,
            hup: install(SignalKind::hangup(), "SIGHUP")?,
        })
    }

    async fn next(&mut self) -> DaemonSignal {
        tokio::select! {
            _ = self.term.recv() => DaemonSignal::Shutdown("SIGTERM"),
            _ = self.int.recv() => DaemonSignal::Shutdown("SIGINT"),
            _ = self.hup.recv() => DaemonSignal::Reload,
        }
    }
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: LogharborConfig,
    /// Source of the configuration, re-read on SIGHUP.
    config_path: Option<PathBuf>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl Orchestrator {
    /// Load configuration from `config_path` and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = LogharborConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config, Some(config_path.to_path_buf()))
    }

    /// Build from an already-loaded configuration.
    ///
    /// Without a `config_path`, SIGHUP only restarts the tailer watch.
    pub fn build_from_config(
        config: LogharborConfig,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
        }

        Ok(Self {
            config,
            config_path,
            start_time: Instant::now(),
        })
    }

    /// Start the workers and run until SIGTERM or SIGINT.
    pub async fn run(&mut self) -> Result<()> {
        let pid_path = self.pid_path();
        if let Some(path) = &pid_path {
            write_pid_file(path)?;
        }

        let mut signals = match Signals::install() {
            Ok(s) => s,
            Err(e) => {
                if let Some(path) = &pid_path {
                    remove_pid_file(path);
                }
                return Err(e);
            }
        };

        let mut workers = Workers::start(self.config.clone());
        tracing::info!(pid = std::process::id(), "logharbor-daemon running");

        loop {
            match signals.next().await {
                DaemonSignal::Shutdown(name) => {
                    tracing::info!(signal = name, "shutdown signal received");
                    break;
                }
                DaemonSignal::Reload => {
                    tracing::info!(signal = "SIGHUP", "reload requested");
                    self.reload(&mut workers).await;
                }
            }
        }

        workers.shutdown().await;

        if let Some(path) = &pid_path {
            remove_pid_file(path);
        }

        tracing::info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "logharbor-daemon shut down"
        );
        Ok(())
    }

    /// Re-read the configuration and apply it to `workers`.
    ///
    /// An unreadable or invalid file keeps the running configuration; the
    /// tailer watch is restarted either way.
    pub async fn reload(&mut self, workers: &mut Workers) {
        let Some(path) = self.config_path.clone() else {
            restart_tailer(workers);
            metrics::counter!(m::DAEMON_RELOADS_TOTAL, m::LABEL_RESULT => "skipped").increment(1);
            return;
        };

        match LogharborConfig::load(&path).await {
            Ok(mut new_config) => {
                self.carry_process_settings(&mut new_config);
                workers.reload(new_config.clone()).await;
                self.config = new_config;
                tracing::info!(path = %path.display(), "configuration reloaded");
                metrics::counter!(m::DAEMON_RELOADS_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "reload failed, keeping current configuration"
                );
                restart_tailer(workers);
                metrics::counter!(m::DAEMON_RELOADS_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);
            }
        }
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &LogharborConfig {
        &self.config
    }

    fn pid_path(&self) -> Option<PathBuf> {
        let path = &self.config.general.pid_file;
        (!path.as_os_str().is_empty()).then(|| path.clone())
    }

    /// Settings bound to the process lifetime cannot change on reload.
    fn carry_process_settings(&self, new_config: &mut LogharborConfig) {
        if new_config.general != self.config.general {
            tracing::warn!("[general] changes take effect on restart");
            new_config.general = self.config.general.clone();
        }
        if new_config.metrics != self.config.metrics {
            tracing::warn!("[metrics] changes take effect on restart");
            new_config.metrics = self.config.metrics.clone();
        }
    }
}

fn restart_tailer(workers: &Workers) {
    if let Err(e) = workers.tailer().restart() {
        tracing::error!(error = %e, "failed to restart tailer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> LogharborConfig {
        let mut config = LogharborConfig::default();
        config.paths.log_file = dir.join("messages");
        config.paths.socket_path = dir.join("logharbor.sock");
        config.general.pid_file = dir.join("logharbor.pid");
        config
    }

    #[test]
    fn build_from_config_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.buffer.trim_size = config.buffer.max_size + 1;
        assert!(Orchestrator::build_from_config(config, None).is_err());
    }

    #[test]
    fn empty_pid_path_disables_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.general.pid_file = PathBuf::new();
        let orch = Orchestrator::build_from_config(config, None).unwrap();
        assert!(orch.pid_path().is_none());
    }

    #[test]
    fn process_settings_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let orch = Orchestrator::build_from_config(config_in(dir.path()), None).unwrap();

        let mut new_config = config_in(dir.path());
        new_config.general.log_level = "debug".to_owned();
        new_config.buffer.max_size = 500;
        new_config.buffer.trim_size = 50;
        orch.carry_process_settings(&mut new_config);

        assert_eq!(new_config.general.log_level, orch.config().general.log_level);
        assert_eq!(new_config.buffer.max_size, 500);
    }
}
