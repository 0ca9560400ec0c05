//! `logharbor files` command handler

use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

use logharbor_core::config::LogharborConfig;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `files` command.
pub async fn execute(config: &LogharborConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let dir = config.paths.log_dir();
    let report = FilesReport {
        directory: dir.display().to_string(),
        files: list_files(&dir)?,
    };
    writer.render(&report)
}

/// Regular files in `dir`, newest first.
pub fn list_files(dir: &Path) -> Result<Vec<FileEntry>, CliError> {
    let mut entries: Vec<(SystemTime, FileEntry)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let meta = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "cannot stat file");
                continue;
            }
        };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((
            modified,
            FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                size: human_size(meta.len()),
                modified: DateTime::<Local>::from(modified)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            },
        ));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
    Ok(entries.into_iter().map(|(_, e)| e).collect())
}

/// `B` below 1 KiB, then one decimal `KB`, then `MB`.
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    match bytes {
        b if b < KB => format!("{} B", b),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{:.1} MB", b as f64 / MB as f64),
    }
}

/// One file in the log directory.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    pub size: String,
    /// Local time
    pub modified: String,
}

#[derive(Debug, Serialize)]
pub struct FilesReport {
    pub directory: String,
    pub files: Vec<FileEntry>,
}

impl Render for FilesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Log directory: {}", self.directory.bold())?;
        writeln!(w)?;
        writeln!(w, "{:<48} {:>10}  Modified", "Name", "Size")?;
        writeln!(w, "{}", "-".repeat(80))?;
        for f in &self.files {
            writeln!(w, "{:<48} {:>10}  {}", f.name, f.size, f.modified)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::time::Duration;

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.0 KB");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_list_files_newest_first_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        for (name, age_secs) in [("old.gz", 300), ("messages", 0), ("mid.gz", 60)] {
            let file = File::create(dir.path().join(name)).unwrap();
            file.set_modified(now - Duration::from_secs(age_secs)).unwrap();
        }
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let files = list_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["messages", "mid.gz", "old.gz"]);
        assert_eq!(files[0].size, "0 B");
    }

    #[test]
    fn test_list_files_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
