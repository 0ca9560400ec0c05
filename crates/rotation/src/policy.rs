//! 로테이션 판단
//!
//! 라이브 파일 전체를 한 번 훑어 첫/마지막 타임스탬프 필드를 모으고,
//! 가장 이른 시각의 나이 또는 파일 크기로 로테이션 여부를 결정합니다.
//! 라인은 손실 허용 UTF-8로 읽으므로 잘못된 바이트가 있어도 계속 진행합니다.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use logharbor_core::config::RotationConfig;
use logharbor_core::record::leading_timestamp;
use logharbor_core::timestamp;

const BYTES_PER_MB: u64 = 1024 * 1024;
const SECS_PER_DAY: i64 = 86_400;

/// 파일에 기록된 첫/마지막 타임스탬프 필드 원문
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

/// 로테이션 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    /// 가장 이른 레코드가 기준 일수보다 오래됨
    Age { days: i64 },
    /// 파일 크기가 기준을 넘음
    Size { bytes: u64 },
    /// 수동 요청
    Forced,
}

impl std::fmt::Display for RotationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Age { days } => write!(f, "age ({days} days)"),
            Self::Size { bytes } => write!(f, "size ({bytes} bytes)"),
            Self::Forced => f.write_str("forced"),
        }
    }
}

/// 나이/크기 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_age_days: u32,
    pub max_size_bytes: u64,
}

impl RotationPolicy {
    pub fn from_config(config: &RotationConfig) -> Self {
        Self {
            max_age_days: config.max_age_days,
            max_size_bytes: config.max_size_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    /// 로테이션이 필요하면 사유를 반환합니다.
    ///
    /// 나이는 경과 일수를 내림하여 `max_age_days`를 *초과*할 때만 해당합니다.
    /// 오프셋이 없는 타임스탬프는 `naive_offset_minutes`로 해석합니다.
    pub fn evaluate(
        &self,
        earliest: Option<&str>,
        size_bytes: u64,
        now: DateTime<Utc>,
        naive_offset_minutes: i32,
    ) -> Option<RotationTrigger> {
        if let Some(raw) = earliest {
            match timestamp::normalize(raw, naive_offset_minutes) {
                Some(start) => {
                    let days = (now - start).num_seconds().div_euclid(SECS_PER_DAY);
                    if days > i64::from(self.max_age_days) {
                        return Some(RotationTrigger::Age { days });
                    }
                }
                None => warn!(value = raw, "could not parse log start date"),
            }
        }

        (size_bytes > self.max_size_bytes).then_some(RotationTrigger::Size { bytes: size_bytes })
    }
}

/// 파일의 첫/마지막 타임스탬프 필드를 수집합니다.
///
/// 구분자가 있는 라인만 셉니다. 그런 라인이 없으면 `None`입니다.
pub fn scan_date_range(path: &Path) -> std::io::Result<Option<DateRange>> {
    let reader = BufReader::new(File::open(path)?);
    let mut earliest: Option<String> = None;
    let mut latest: Option<String> = None;

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if let Some(ts) = leading_timestamp(&line) {
            if earliest.is_none() {
                earliest = Some(ts.to_owned());
            }
            latest = Some(ts.to_owned());
        }
    }

    Ok(earliest.zip(latest).map(|(earliest, latest)| DateRange { earliest, latest }))
}

/// 파일을 검사하여 로테이션 사유를 반환합니다. 파일이 없으면 `None`입니다.
pub fn should_rotate(
    path: &Path,
    policy: &RotationPolicy,
    now: DateTime<Utc>,
    naive_offset_minutes: i32,
) -> std::io::Result<Option<RotationTrigger>> {
    let size_bytes = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "live log does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let range = scan_date_range(path)?;

    let trigger = policy.evaluate(
        range.as_ref().map(|r| r.earliest.as_str()),
        size_bytes,
        now,
        naive_offset_minutes,
    );
    if let Some(trigger) = trigger {
        info!(path = %path.display(), %trigger, "log should rotate");
    }
    Ok(trigger)
}
