//! `logharbor config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use logharbor_core::config::LogharborConfig;
use logharbor_core::error::{ConfigError, LogharborError};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
pub const SECTIONS: &[&str] = &[
    "general",
    "paths",
    "buffer",
    "tailer",
    "rotation",
    "retention",
    "query",
    "metrics",
];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the file, reporting every error found.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let errors = match LogharborConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    let report = ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration. A missing file shows the defaults.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (config, source) = load_or_default(config_path).await?;
    let report = build_report(&config, source, section)?;
    writer.render(&report)
}

async fn load_or_default(config_path: &Path) -> Result<(LogharborConfig, String), CliError> {
    match LogharborConfig::load(config_path).await {
        Ok(config) => Ok((config, config_path.display().to_string())),
        Err(LogharborError::Config(ConfigError::FileNotFound { .. })) => {
            info!(path = %config_path.display(), "config file not found, showing defaults");
            let mut config = LogharborConfig::default();
            config.apply_env_overrides();
            Ok((config, "(defaults)".to_owned()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Serialize the whole config or one section of it.
pub fn build_report(
    config: &LogharborConfig,
    source: String,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let to_toml = |r: Result<String, toml::ser::Error>| {
        r.map_err(|e| CliError::Command(format!("failed to serialize config: {}", e)))
    };

    let config_toml = match section.as_deref() {
        None => to_toml(toml::to_string_pretty(config))?,
        Some("general") => to_toml(toml::to_string_pretty(&config.general))?,
        Some("paths") => to_toml(toml::to_string_pretty(&config.paths))?,
        Some("buffer") => to_toml(toml::to_string_pretty(&config.buffer))?,
        Some("tailer") => to_toml(toml::to_string_pretty(&config.tailer))?,
        Some("rotation") => to_toml(toml::to_string_pretty(&config.rotation))?,
        Some("retention") => to_toml(toml::to_string_pretty(&config.retention))?,
        Some("query") => to_toml(toml::to_string_pretty(&config.query))?,
        Some("metrics") => to_toml(toml::to_string_pretty(&config.metrics))?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source,
        section,
        config_toml,
    })
}

/// Configuration display report.
///
/// `config_toml` is text-only; JSON output carries the source and section.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{}]", section).bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)
    }
}

/// Configuration validation report.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty when valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
