//! Output formatting: text vs JSON rendering
//!
//! Every subcommand payload implements both `Serialize` (JSON) and
//! [`Render`] (text); [`OutputWriter`] picks one.

use std::io::Write;

use serde::Serialize;

use logharbor_core::record::LogRecord;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes CLI payloads in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(&mut handle, payload)
    }

    /// Render a payload to an arbitrary writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable text rendering.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Print records as a fixed-width table, colouring the severity column.
pub fn write_records(w: &mut dyn Write, rows: &[LogRecord]) -> std::io::Result<()> {
    use colored::Colorize;

    writeln!(
        w,
        "{:<26} {:<16} {:<8} {:<8} {:<16} {:<7} Message",
        "Timestamp", "Host", "Facility", "Severity", "Program", "PID"
    )?;
    writeln!(w, "{}", "-".repeat(100))?;

    for r in rows {
        let severity = match r.severity.as_str() {
            "emerg" | "alert" | "crit" | "err" | "error" => r.severity.red(),
            "warning" | "warn" => r.severity.yellow(),
            "debug" => r.severity.dimmed(),
            _ => r.severity.normal(),
        };
        writeln!(
            w,
            "{:<26} {:<16} {:<8} {:<8} {:<16} {:<7} {}",
            r.timestamp, r.host, r.facility, severity, r.program, r.pid, r.message
        )?;
    }
    Ok(())
}
