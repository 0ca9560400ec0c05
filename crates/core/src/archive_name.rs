//! 아카이브 파일명 규칙
//!
//! 로테이션된 파일은 `<base>.<YYYY-MM-DD_HH-MM-SS>-to-<YYYY-MM-DD_HH-MM-SS>`로 이름이 바뀌고,
//! 압축 후 `.gz`가 붙습니다. 이름에 담긴 범위는 파일 안 첫/마지막 라인의 벽시계 시각입니다.

use chrono::NaiveDateTime;

use crate::error::RecordError;
use crate::timestamp;

/// 압축 아카이브 확장자
pub const GZ_EXTENSION: &str = "gz";

/// 범위 시작/끝 구분자
const RANGE_SEPARATOR: &str = "-to-";

/// 아카이브 이름에 담긴 시간 범위 (양 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ArchiveRange {
    /// `[from, to)` 구간과 겹치는지 확인합니다. 열린 쪽 경계는 `None`입니다.
    pub fn overlaps(&self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> bool {
        from.is_none_or(|from| self.end >= from) && to.is_none_or(|to| self.start <= to)
    }
}

/// 로테이션된 파일명을 만듭니다 (압축 전).
///
/// `first`/`last`는 파일의 첫/마지막 타임스탬프 필드 원문입니다.
pub fn rotated_file_name(base: &str, first: &str, last: &str) -> String {
    format!(
        "{base}.{}{RANGE_SEPARATOR}{}",
        timestamp::archive_stamp(first),
        timestamp::archive_stamp(last)
    )
}

/// 파일명이 `base`의 로테이션 아카이브(`<base>.*-to-*.gz`)인지 확인합니다.
///
/// 범위 구분자가 없는 `messages.1.gz` 같은 다른 도구의 파일은 제외합니다.
/// 시각 부분이 해석되는지는 확인하지 않습니다.
pub fn is_archive(file_name: &str, base: &str) -> bool {
    file_name
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_suffix(".gz"))
        .and_then(|stem| stem.split_once(RANGE_SEPARATOR))
        .is_some_and(|(start, end)| !start.is_empty() && !end.is_empty())
}

/// 아카이브 파일명에서 시간 범위를 읽습니다.
///
/// `base.` 접두어가 없거나 범위 형식이 맞지 않으면 에러를 반환합니다.
pub fn parse_range(file_name: &str, base: &str) -> Result<ArchiveRange, RecordError> {
    let invalid = || RecordError::ArchiveName {
        name: file_name.to_owned(),
    };

    let rest = file_name
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
        .ok_or_else(invalid)?;
    let rest = rest.strip_suffix(".gz").unwrap_or(rest);
    let (start, end) = rest.split_once(RANGE_SEPARATOR).ok_or_else(invalid)?;

    let start = timestamp::parse_archive_stamp(start).ok_or_else(invalid)?;
    let end = timestamp::parse_archive_stamp(end).ok_or_else(invalid)?;
    Ok(ArchiveRange { start, end })
}
