//! 후보 파일 선택
//!
//! 아카이브 이름의 범위는 파일 안 레코드의 벽시계 시각이고 오프셋 정보가 없습니다.
//! 오프셋 없는 레코드는 호출자 오프셋으로, 오프셋이 있던 레코드는 원래 오프셋으로
//! 해석되므로, 이름의 시각을 UTC로 보고 가능한 최대 오프셋([`NAME_SLACK_HOURS`])만큼
//! 질의 구간을 넓혀 비교합니다. 경계는 양 끝을 포함합니다.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use logharbor_core::archive_name;

use crate::error::ArchiveError;

/// 벽시계 시각과 UTC의 최대 차이 (UTC+14 ~ UTC-12)
pub const NAME_SLACK_HOURS: i64 = 14;

/// 질의 구간과 겹치는 아카이브와 라이브 파일을 반환합니다.
///
/// 아카이브는 이름순, 라이브 파일은 항상 마지막입니다.
/// 범위를 해석할 수 없는 아카이브도 포함합니다. 구간 밖 레코드는 스캔 단계에서 걸러집니다.
pub fn select_files(
    log_file: &Path,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let base = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::LogPath {
            path: log_file.to_path_buf(),
        })?;
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let slack = Duration::hours(NAME_SLACK_HOURS);
    let from = start.map(|t| t.naive_utc() - slack);
    let to = end.map(|t| t.naive_utc() + slack);

    let list_err = |source| ArchiveError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !archive_name::is_archive(name, base) {
            continue;
        }

        match archive_name::parse_range(name, base) {
            Ok(range) if range.overlaps(from, to) => files.push(entry.path()),
            Ok(_) => debug!(file = name, "archive outside query range"),
            Err(e) => {
                warn!(file = name, error = %e, "failed to parse rotated log filename, including it");
                files.push(entry.path());
            }
        }
    }

    files.sort();
    files.push(log_file.to_path_buf());
    Ok(files)
}
