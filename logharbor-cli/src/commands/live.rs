//! `logharbor live` command handler

use std::io::Write;

use serde::Serialize;

use logharbor_core::config::LogharborConfig;
use logharbor_log_pipeline::{LinesResponse, LiveClient, LiveQuery, LiveView};

use crate::cli::LiveArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, write_records};

/// Execute the `live` command.
///
/// When the daemon cannot be reached the synthetic error row is still
/// rendered, then the command fails with "daemon not reachable".
pub async fn execute(
    args: LiveArgs,
    config: &LogharborConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let client = LiveClient::new(&config.paths.socket_path, config.query.client_timeout());
    let query = LiveQuery {
        filter: args.filter.into(),
        num_lines: args.num_lines,
    };
    let limit = config.query.line_limit();

    match client.fetch().await {
        Ok(response) => {
            let report = LiveReport::new(query.apply(response, &limit), args.options);
            writer.render(&report)
        }
        Err(e) => {
            tracing::debug!(error = %e, "live query failed");
            let view = query.apply(LinesResponse::fallback(&e), &limit);
            writer.render(&LiveReport::new(view, false))?;
            Err(CliError::DaemonUnavailable(e.to_string()))
        }
    }
}

/// Live buffer view for output.
#[derive(Debug, Serialize)]
pub struct LiveReport {
    #[serde(flatten)]
    pub view: LiveView,
    #[serde(skip)]
    pub show_options: bool,
}

impl LiveReport {
    pub fn new(view: LiveView, show_options: bool) -> Self {
        Self { view, show_options }
    }
}

impl Render for LiveReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let v = &self.view;
        writeln!(
            w,
            "Live buffer: {}/{} lines, showing {} of {}",
            v.fill_level.to_string().bold(),
            v.max_size,
            v.rows.len(),
            v.total_rows
        )?;
        writeln!(w)?;
        write_records(w, &v.rows)?;

        if self.show_options {
            let o = &v.options;
            writeln!(w)?;
            writeln!(w, "{}", "Filter values".bold())?;
            for (name, values) in [
                ("host", &o.hosts),
                ("facility", &o.facilities),
                ("severity", &o.severities),
                ("program", &o.programs),
                ("pid", &o.pids),
            ] {
                writeln!(w, "  {:<9} {}", name, values.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use logharbor_core::filter::LineLimit;
    use logharbor_core::record::LogRecord;

    fn view() -> LiveView {
        let response = LinesResponse {
            lines: vec![
                LogRecord::parse("t1||web01|daemon|info|cron|1|job started"),
                LogRecord::parse("t2||db01|auth|err|sshd|2|login failed"),
            ],
            fill_level: 2,
            max_size: 2200,
        };
        LiveQuery::default().apply(response, &LineLimit::default())
    }

    #[test]
    fn test_text_shows_fill_level_and_rows() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        LiveReport::new(view(), false).render_text(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Live buffer: 2/2200 lines, showing 2 of 2"));
        assert!(text.contains("login failed"));
        assert!(!text.contains("Filter values"));
    }

    #[test]
    fn test_text_lists_filter_values_on_request() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        LiveReport::new(view(), true).render_text(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("host      db01, web01"));
        assert!(text.contains("severity  err, info"));
    }

    #[test]
    fn test_json_flattens_view() {
        let json = serde_json::to_value(LiveReport::new(view(), true)).unwrap();
        assert_eq!(json["fill_level"], 2);
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert!(json.get("show_options").is_none());
    }
}
