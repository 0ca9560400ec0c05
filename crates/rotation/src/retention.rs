//! 아카이브 보존 정책
//!
//! 로그 디렉토리에서 `<base>.*.gz` 아카이브를 수정 시각 순으로 정렬한 뒤
//! 세 단계로 삭제합니다.
//!
//! 1. 개수가 `min_count`를 넘는 동안 가장 오래된 것부터
//! 2. 전체 크기가 `total_max_bytes`를 넘는 동안 가장 오래된 것부터
//! 3. 수정 시각이 `max_age`보다 오래된 것 전부 (1, 2와 무관하게)
//!
//! 삭제에 실패한 파일은 기록만 하고 이후 단계의 대상에서 제외합니다.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use metrics::counter;
use tracing::{error, info};

use logharbor_core::archive_name;
use logharbor_core::config::RetentionConfig;
use logharbor_core::metrics as m;

const BYTES_PER_MB: u64 = 1024 * 1024;
const SECS_PER_DAY: u64 = 86_400;

/// 삭제 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPass {
    Count,
    Size,
    Age,
}

impl RetentionPass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Size => "size",
            Self::Age => "age",
        }
    }
}

/// 보존 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub min_count: usize,
    pub total_max_bytes: u64,
    pub max_age: Duration,
}

impl RetentionPolicy {
    /// 설정에서 만듭니다. `delete_oldest`가 꺼져 있으면 `None`입니다.
    pub fn from_config(config: &RetentionConfig) -> Option<Self> {
        config.delete_oldest.then(|| Self {
            min_count: config.min_count,
            total_max_bytes: config.total_max_mb.saturating_mul(BYTES_PER_MB),
            max_age: Duration::from_secs(u64::from(config.max_days) * SECS_PER_DAY),
        })
    }
}

/// 아카이브 파일 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// 보존 정책 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub deleted: Vec<(PathBuf, RetentionPass)>,
    pub remaining_count: usize,
    pub remaining_bytes: u64,
}

/// 디렉토리의 아카이브를 수정 시각 오름차순으로 나열합니다.
pub fn list_archives(dir: &Path, base: &str) -> std::io::Result<Vec<ArchiveFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !archive_name::is_archive(name, base) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        files.push(ArchiveFile {
            path: entry.path(),
            size: meta.len(),
            modified: meta.modified()?,
        });
    }
    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// 보존 정책을 적용합니다. 블로킹 I/O입니다.
pub fn enforce(
    dir: &Path,
    base: &str,
    policy: &RetentionPolicy,
    now: SystemTime,
) -> std::io::Result<RetentionReport> {
    let mut files = list_archives(dir, base)?;
    let mut report = RetentionReport::default();

    while files.len() > policy.min_count {
        let oldest = files.remove(0);
        delete(oldest, RetentionPass::Count, &mut report);
    }

    while !files.is_empty() && total_size(&files) > policy.total_max_bytes {
        let oldest = files.remove(0);
        delete(oldest, RetentionPass::Size, &mut report);
    }

    let cutoff = now.checked_sub(policy.max_age).unwrap_or(SystemTime::UNIX_EPOCH);
    let (expired, kept): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| f.modified < cutoff);
    for file in expired {
        delete(file, RetentionPass::Age, &mut report);
    }

    report.remaining_count = kept.len();
    report.remaining_bytes = total_size(&kept);
    info!(
        files = report.remaining_count,
        total_mb = format!("{:.1}", report.remaining_bytes as f64 / BYTES_PER_MB as f64),
        deleted = report.deleted.len(),
        "rotated logs retained"
    );
    Ok(report)
}

fn total_size(files: &[ArchiveFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

fn delete(file: ArchiveFile, pass: RetentionPass, report: &mut RetentionReport) {
    match std::fs::remove_file(&file.path) {
        Ok(()) => {
            info!(path = %file.path.display(), pass = pass.as_str(), "deleted rotated log file");
            counter!(m::RETENTION_DELETIONS_TOTAL, m::LABEL_PASS => pass.as_str()).increment(1);
            report.deleted.push((file.path, pass));
        }
        Err(e) => {
            error!(path = %file.path.display(), pass = pass.as_str(), error = %e, "failed to delete rotated log file");
        }
    }
}
