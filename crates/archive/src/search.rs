//! 아카이브 조회 인터페이스
//!
//! 질의 시각은 호출자의 로컬 벽시계 값(`2024-01-01T00:30` 등)이며 `tz_offset_minutes`로
//! UTC로 바꿉니다. 시각을 생략하면 현재 UTC 분 단위 절사 기준 "최근 5분"입니다.

use std::path::PathBuf;

use chrono::{DateTime, Duration, DurationRound, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use logharbor_core::filter::{self, LineLimit, RecordFilter};
use logharbor_core::metrics as m;
use logharbor_core::record::LogRecord;
use logharbor_core::timestamp;

use crate::error::ArchiveError;
use crate::scan::{self, ScanWindow};
use crate::select;

/// 기본 조회 구간 길이
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// 아카이브 질의
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveQuery {
    /// 시작 시각 (포함)
    pub start: Option<String>,
    /// 끝 시각 (제외)
    pub end: Option<String>,
    /// `UTC = 로컬 + offset`. 없으면 0
    pub tz_offset_minutes: Option<i32>,
    pub filter: RecordFilter,
    pub num_lines: Option<usize>,
}

/// 아카이브 질의 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResult {
    /// 시각 오름차순, 최근 `num_lines`개
    pub rows: Vec<LogRecord>,
    /// 구간 안 레코드 수 (필터 적용 전)
    pub total_rows: usize,
    /// 필터를 통과한 레코드 수 (개수 제한 전)
    pub matched_rows: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub num_lines: usize,
    /// 스캔한 파일
    pub files: Vec<PathBuf>,
}

impl ArchiveQuery {
    /// 질의 구간을 UTC로 확정합니다.
    pub fn resolve_range(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ArchiveError> {
        let offset = self.tz_offset_minutes.unwrap_or(0);
        let now = now.duration_trunc(Duration::minutes(1)).unwrap_or(now);

        let start = match &self.start {
            Some(value) => parse_bound(value, offset)?,
            None => now - Duration::minutes(DEFAULT_WINDOW_MINUTES),
        };
        let end = match &self.end {
            Some(value) => parse_bound(value, offset)?,
            None => now,
        };
        Ok((start, end))
    }
}

fn parse_bound(value: &str, offset: i32) -> Result<DateTime<Utc>, ArchiveError> {
    timestamp::normalize(value, offset).ok_or_else(|| ArchiveError::InvalidTime {
        value: value.to_owned(),
    })
}

/// 아카이브 검색기
#[derive(Debug, Clone)]
pub struct ArchiveSearch {
    log_file: PathBuf,
    limit: LineLimit,
}

impl ArchiveSearch {
    pub fn new(log_file: impl Into<PathBuf>, limit: LineLimit) -> Self {
        Self {
            log_file: log_file.into(),
            limit,
        }
    }

    pub fn from_config(config: &logharbor_core::LogharborConfig) -> Self {
        Self::new(config.paths.log_file.clone(), config.query.line_limit())
    }

    /// 질의를 실행합니다. 블로킹 I/O입니다.
    ///
    /// 개별 파일을 읽지 못하면 기록 후 건너뜁니다.
    pub fn search(
        &self,
        query: &ArchiveQuery,
        now: DateTime<Utc>,
    ) -> Result<ArchiveResult, ArchiveError> {
        counter!(m::ARCHIVE_SEARCHES_TOTAL).increment(1);
        let (start, end) = query.resolve_range(now)?;
        let num_lines = self.limit.resolve(query.num_lines);

        let files = select::select_files(&self.log_file, Some(start), Some(end))?;
        info!(files = files.len(), %start, %end, "archive search selected files");

        let window = ScanWindow {
            start: Some(start),
            end: Some(end),
            offset_minutes: query.tz_offset_minutes.unwrap_or(0),
        };
        let mut all = Vec::new();
        for file in &files {
            match scan::scan_file(file, &window) {
                Ok(rows) => all.extend(rows),
                Err(e) => error!(path = %file.display(), error = %e, "failed to parse archive file"),
            }
        }

        let total_rows = all.len();
        let mut matched: Vec<_> = all
            .into_iter()
            .filter(|row| query.filter.matches(&row.record))
            .collect();
        matched.sort_by_key(|row| row.at);
        let matched_rows = matched.len();
        let rows = filter::keep_last(matched, num_lines)
            .into_iter()
            .map(|row| row.record)
            .collect();

        Ok(ArchiveResult {
            rows,
            total_rows,
            matched_rows,
            start,
            end,
            num_lines,
            files,
        })
    }
}
