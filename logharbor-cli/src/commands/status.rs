//! `logharbor status` command handler

use std::io::Write;

use serde::Serialize;

use logharbor_core::config::LogharborConfig;
use logharbor_core::pid;
use logharbor_log_pipeline::LiveClient;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `status` command.
///
/// A stopped daemon is reported, not treated as an error.
pub async fn execute(config: &LogharborConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let pid_file = &config.general.pid_file;
    let daemon_pid = match pid::read_pid_file(pid_file) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(pid_file = %pid_file.display(), error = %e, "failed to read pid file");
            None
        }
    };
    let daemon_running = daemon_pid.is_some_and(pid::is_process_alive);

    let client = LiveClient::new(&config.paths.socket_path, config.query.client_timeout());
    let (buffer, socket_error) = match client.fetch().await {
        Ok(resp) => (
            Some(BufferStatus {
                fill_level: resp.fill_level,
                max_size: resp.max_size,
            }),
            None,
        ),
        Err(e) => (None, Some(e.to_string())),
    };

    let report = StatusReport {
        daemon_running,
        pid: daemon_pid.filter(|_| daemon_running),
        pid_file: pid_file.display().to_string(),
        socket: config.paths.socket_path.display().to_string(),
        buffer,
        socket_error,
        log_file: config.paths.log_file.display().to_string(),
        rotation_enabled: config.rotation.enabled,
    };
    writer.render(&report)
}

#[derive(Debug, Serialize)]
pub struct BufferStatus {
    pub fill_level: usize,
    pub max_size: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub daemon_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub pid_file: String,
    pub socket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<BufferStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_error: Option<String>,
    pub log_file: String,
    pub rotation_enabled: bool,
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match (self.daemon_running, self.pid) {
            (true, Some(pid)) => writeln!(w, "Daemon:   {} (pid {})", "running".green().bold(), pid)?,
            _ => writeln!(w, "Daemon:   {}", "not running".red().bold())?,
        }

        match (&self.buffer, &self.socket_error) {
            (Some(b), _) => {
                #[allow(clippy::cast_precision_loss)]
                let pct = if b.max_size == 0 {
                    0.0
                } else {
                    b.fill_level as f64 * 100.0 / b.max_size as f64
                };
                writeln!(w, "Buffer:   {}/{} lines ({:.0}%)", b.fill_level, b.max_size, pct)?;
            }
            (None, Some(err)) => writeln!(w, "Buffer:   {}", err.yellow())?,
            (None, None) => writeln!(w, "Buffer:   unknown")?,
        }

        writeln!(w, "Socket:   {}", self.socket.dimmed())?;
        writeln!(w, "Log file: {}", self.log_file.dimmed())?;
        writeln!(
            w,
            "Rotation: {}",
            if self.rotation_enabled { "enabled" } else { "disabled" }
        )?;
        Ok(())
    }
}
