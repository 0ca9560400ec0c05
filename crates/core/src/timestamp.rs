//! 타임스탬프 정규화 — ISO-8601 문자열을 UTC 시각으로 변환
//!
//! 로그 파일의 타임스탬프는 오프셋이 포함된 형식(`2024-01-01T00:00:00+09:00`, `...Z`)과
//! 오프셋이 없는 로컬 시각(`2024-01-01T00:00:00`)이 섞여 있을 수 있습니다.
//! 비교는 항상 정규화된 UTC 시각으로 수행하며, 오프셋이 없는 시각에는
//! 호출자의 타임존 오프셋(분)을 적용합니다.
//!
//! # 오프셋 규약
//! 브라우저의 `Date.getTimezoneOffset()`과 같은 규약을 따릅니다:
//! `UTC = 로컬 시각 + offset_minutes`. 예를 들어 KST(+09:00)는 `-540`입니다.

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

/// 아카이브 파일명에 사용하는 시각 형식
pub const ARCHIVE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 오프셋 없는 타임스탬프에 허용하는 형식 (순서대로 시도)
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// ISO-8601 문자열을 시각으로 파싱합니다.
///
/// 오프셋이 포함된 값은 그 오프셋으로 UTC 변환하고, 오프셋이 없는 값은
/// `naive_offset_minutes`를 더해 UTC로 해석합니다. 파싱할 수 없으면 `None`입니다.
pub fn normalize(value: &str, naive_offset_minutes: i32) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 3339는 날짜/시간 구분자로 'T'만 허용하므로 공백 구분 형식을 한 번 더 시도
    if value.contains(' ') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value.replacen(' ', "T", 1)) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = parse_naive(value)?;
    Some(naive.and_utc() + Duration::minutes(i64::from(naive_offset_minutes)))
}

/// 오프셋을 무시하고 벽시계 시각만 파싱합니다.
///
/// `Z` 또는 `+hh:mm` 접미사가 있으면 제거한 뒤 해석합니다.
pub fn wall_clock(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    parse_naive(value.trim_end_matches('Z'))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// 아카이브 파일명용 시각 문자열을 만듭니다 (`YYYY-MM-DD_HH-MM-SS`).
///
/// ISO-8601로 해석되면 벽시계 시각을 그대로 형식화합니다.
/// 해석할 수 없으면 문자 치환(`T`/공백 → `_`, `:` → `-`) 후 앞 19자를 사용합니다.
pub fn archive_stamp(value: &str) -> String {
    if let Some(dt) = wall_clock(value) {
        return dt.format(ARCHIVE_STAMP_FORMAT).to_string();
    }
    value
        .trim()
        .replace('T', "_")
        .replace(':', "-")
        .replace(' ', "_")
        .chars()
        .take(19)
        .collect()
}

/// `YYYY-MM-DD_HH-MM-SS` 형식의 문자열을 파싱합니다.
pub fn parse_archive_stamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ARCHIVE_STAMP_FORMAT).ok()
}

/// 오프셋 없는 시각에 호출자 오프셋을 적용해 UTC로 변환합니다.
pub fn naive_to_utc(naive: NaiveDateTime, offset_minutes: i32) -> DateTime<Utc> {
    naive.and_utc() + Duration::minutes(i64::from(offset_minutes))
}

/// 호스트 로컬 타임존의 오프셋(분)을 같은 규약으로 반환합니다.
pub fn local_offset_minutes() -> i32 {
    -Local::now().offset().local_minus_utc() / 60
}
