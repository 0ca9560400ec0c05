//! `logharbor search` command handler

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use logharbor_archive::{ArchiveQuery, ArchiveResult, ArchiveSearch};
use logharbor_core::config::LogharborConfig;

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, write_records};

/// Execute the `search` command.
pub async fn execute(
    args: SearchArgs,
    config: &LogharborConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let query = ArchiveQuery {
        start: args.start,
        end: args.end,
        tz_offset_minutes: args.tz_offset,
        filter: args.filter.into(),
        num_lines: args.num_lines,
    };
    let search = ArchiveSearch::from_config(config);

    let result = tokio::task::spawn_blocking(move || search.search(&query, Utc::now()))
        .await
        .map_err(|e| CliError::Command(format!("search task failed: {}", e)))??;

    writer.render(&SearchReport(result))
}

/// Archive search result for output.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SearchReport(pub ArchiveResult);

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let r = &self.0;
        writeln!(
            w,
            "Range: {} .. {} (UTC)",
            r.start.format("%Y-%m-%d %H:%M:%S").to_string().bold(),
            r.end.format("%Y-%m-%d %H:%M:%S").to_string().bold()
        )?;
        writeln!(
            w,
            "Files scanned: {}, in range: {}, matched: {}, showing: {}",
            r.files.len(),
            r.total_rows,
            r.matched_rows,
            r.rows.len()
        )?;
        writeln!(w)?;

        if r.rows.is_empty() {
            writeln!(w, "{}", "No matching lines.".dimmed())?;
            return Ok(());
        }
        write_records(w, &r.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use logharbor_core::record::LogRecord;

    fn result(rows: Vec<LogRecord>) -> ArchiveResult {
        ArchiveResult {
            total_rows: 5,
            matched_rows: rows.len(),
            rows,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap(),
            num_lines: 30,
            files: vec!["/var/log/logharbor/messages".into()],
        }
    }

    #[test]
    fn test_text_summary_line() {
        colored::control::set_override(false);
        let rows = vec![LogRecord::parse(
            "2024-01-01T00:01:00+00:00||web01|daemon|info|cron|1|job",
        )];
        let mut out = Vec::new();
        SearchReport(result(rows)).render_text(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Range: 2024-01-01 00:00:00 .. 2024-01-01 00:05:00 (UTC)"));
        assert!(text.contains("Files scanned: 1, in range: 5, matched: 1, showing: 1"));
        assert!(text.contains("web01"));
    }

    #[test]
    fn test_text_empty_result() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        SearchReport(result(Vec::new())).render_text(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No matching lines."));
    }

    #[test]
    fn test_json_is_the_result_itself() {
        let json = serde_json::to_value(SearchReport(result(Vec::new()))).unwrap();
        assert_eq!(json["total_rows"], 5);
        assert_eq!(json["num_lines"], 30);
    }
}
