//! `logharbor rotate` command handler
//!
//! Runs the rotation procedure in this process, then asks the running daemon
//! (found through its PID file) to reload so its tailer follows the new file.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use logharbor_core::config::LogharborConfig;
use logharbor_core::control::NoopSignal;
use logharbor_core::pid;
use logharbor_rotation::{RotationEngine, RotationOutcome, RotationSettings};

use crate::cli::RotateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rotate` command.
pub async fn execute(
    args: RotateArgs,
    config: &LogharborConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = RotationEngine::new(RotationSettings::from_config(config), Arc::new(NoopSignal));

    let outcome = if args.force {
        Some(engine.force_rotate().await?)
    } else {
        engine.check_once().await?
    };

    let daemon_notified = match &outcome {
        Some(_) => notify_daemon(&config.general.pid_file),
        None => false,
    };

    writer.render(&RotateReport::new(outcome.as_ref(), daemon_notified))
}

/// Send SIGHUP to the daemon if its PID file names a live process.
fn notify_daemon(pid_file: &std::path::Path) -> bool {
    let daemon_pid = match pid::read_pid_file(pid_file) {
        Ok(Some(found)) if pid::is_process_alive(found) => found,
        Ok(_) => {
            tracing::info!(pid_file = %pid_file.display(), "daemon not running, skipping reload");
            return false;
        }
        Err(e) => {
            tracing::warn!(pid_file = %pid_file.display(), error = %e, "cannot read PID file");
            return false;
        }
    };

    match pid::send_reload(daemon_pid) {
        Ok(()) => {
            tracing::info!(pid = daemon_pid, "sent SIGHUP to daemon");
            true
        }
        Err(e) => {
            tracing::warn!(pid = daemon_pid, error = %e, "failed to signal daemon");
            false
        }
    }
}

/// One archive removed by the retention policy.
#[derive(Debug, Serialize)]
pub struct DeletedArchive {
    pub path: PathBuf,
    pub pass: &'static str,
}

/// Rotation outcome for output.
#[derive(Debug, Serialize)]
pub struct RotateReport {
    pub rotated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
    pub compressed: bool,
    pub reopened: bool,
    pub deleted: Vec<DeletedArchive>,
    pub daemon_notified: bool,
}

impl RotateReport {
    pub fn new(outcome: Option<&RotationOutcome>, daemon_notified: bool) -> Self {
        let Some(o) = outcome else {
            return Self {
                rotated: false,
                trigger: None,
                archive: None,
                compressed: false,
                reopened: false,
                deleted: Vec::new(),
                daemon_notified,
            };
        };
        let deleted = o
            .retention
            .iter()
            .flat_map(|r| r.deleted.iter())
            .map(|(path, pass)| DeletedArchive {
                path: path.clone(),
                pass: pass.as_str(),
            })
            .collect();
        Self {
            rotated: true,
            trigger: Some(o.trigger.to_string()),
            archive: Some(o.archive.clone()),
            compressed: o.compressed,
            reopened: o.reopened,
            deleted,
            daemon_notified,
        }
    }
}

impl Render for RotateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if !self.rotated {
            writeln!(w, "Rotation: {}", "not due".yellow())?;
            writeln!(w, "  Use --force to rotate anyway.")?;
            return Ok(());
        }

        writeln!(
            w,
            "Rotation: {} ({})",
            "done".green().bold(),
            self.trigger.as_deref().unwrap_or("unknown")
        )?;
        if let Some(archive) = &self.archive {
            writeln!(w, "  Archive:    {}", archive.display())?;
        }
        writeln!(w, "  Compressed: {}", yes_no(self.compressed))?;
        writeln!(w, "  Reopened:   {}", yes_no(self.reopened))?;
        writeln!(w, "  Daemon:     {}", if self.daemon_notified { "reloaded" } else { "not notified" })?;
        for d in &self.deleted {
            writeln!(w, "  Deleted:    {} ({})", d.path.display(), d.pass.dimmed())?;
        }
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
