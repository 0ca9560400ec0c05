//! 파일 스캔 — gzip 투명 읽기, 시각 정규화, 구간 필터

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::MultiGzDecoder;
use tracing::trace;

use logharbor_core::archive_name::GZ_EXTENSION;
use logharbor_core::record::{LogRecord, leading_timestamp};
use logharbor_core::timestamp;

/// 정규화된 시각이 붙은 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedRecord {
    pub at: DateTime<Utc>,
    pub record: LogRecord,
}

/// 스캔 구간. 열린 쪽은 `None`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// 오프셋 없는 타임스탬프에 적용할 오프셋(분)
    pub offset_minutes: i32,
}

impl ScanWindow {
    /// `[start, end)`에 속하는지
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at < e)
    }
}

/// 파일을 열어 구간에 속하는 레코드를 읽습니다.
///
/// 구분자가 없거나 타임스탬프를 해석할 수 없는 라인은 건너뜁니다.
pub fn scan_file(path: &Path, window: &ScanWindow) -> std::io::Result<Vec<TimedRecord>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    scan_reader(BufReader::new(reader), window)
}

/// 라인 단위 입력에서 구간에 속하는 레코드를 읽습니다.
pub fn scan_reader<R: BufRead>(reader: R, window: &ScanWindow) -> std::io::Result<Vec<TimedRecord>> {
    let mut out = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        let Some(raw) = leading_timestamp(line) else {
            continue;
        };
        let Some(at) = timestamp::normalize(raw, window.offset_minutes) else {
            trace!(value = raw, "skipping line with unparseable timestamp");
            continue;
        };
        if window.contains(at) {
            out.push(TimedRecord {
                at,
                record: LogRecord::parse(line),
            });
        }
    }
    Ok(out)
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == GZ_EXTENSION)
}
