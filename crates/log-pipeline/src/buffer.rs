//! 라이브 윈도우 버퍼 — 용량 제한 링 버퍼
//!
//! [`LogBuffer`]는 가장 최근 로그 레코드를 메모리에 유지합니다.
//! 테일러가 유일한 쓰기 주체이고, 조회 서버가 스냅샷을 읽습니다.
//!
//! # 트림 정책
//! 추가 후 길이가 `max_size`를 넘으면 가장 오래된 `trim_size`개를 한 번에 제거합니다.
//! 한 배치가 `trim_size`보다 많이 넘치면 `trim_size`의 배수만큼 제거하여
//! 어떤 관찰 시점에도 `len <= max_size`가 성립합니다.
//!
//! # 잠금
//! 단일 뮤텍스가 추가와 스냅샷을 모두 보호합니다. 파싱은 잠금 밖에서 수행하고,
//! 잠금은 추가+트림 또는 복사 동안만 유지됩니다. 파일/네트워크 I/O 중에는 잡지 않습니다.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};

use logharbor_core::metrics as m;
use logharbor_core::record::LogRecord;

/// 버퍼 스냅샷 — 조회 시점의 불변 복사본
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 삽입 순서의 레코드
    pub records: Vec<LogRecord>,
    /// 현재 레코드 수
    pub fill_level: usize,
    /// 최대 용량
    pub max_size: usize,
}

/// 추가 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// 추가된 레코드 수
    pub appended: usize,
    /// 트림으로 제거된 레코드 수
    pub trimmed: usize,
    /// 추가 후 레코드 수
    pub fill_level: usize,
}

#[derive(Debug)]
struct Inner {
    records: VecDeque<LogRecord>,
    max_size: usize,
    trim_size: usize,
}

impl Inner {
    /// 용량 불변식을 복구합니다. 제거한 레코드 수를 반환합니다.
    fn enforce_capacity(&mut self) -> usize {
        let len = self.records.len();
        if len <= self.max_size {
            return 0;
        }
        let excess = len - self.max_size;
        let drop = excess.div_ceil(self.trim_size) * self.trim_size;
        let drop = drop.min(len);
        self.records.drain(..drop);
        drop
    }
}

/// 스레드 안전 라이브 윈도우 버퍼
///
/// 데몬 시작 시 하나 생성되어 `Arc`로 테일러와 조회 서버에 전달됩니다.
#[derive(Debug)]
pub struct LogBuffer {
    inner: Mutex<Inner>,
}

impl LogBuffer {
    /// 새 버퍼를 생성합니다.
    ///
    /// `max_size`는 최소 1, `trim_size`는 `1..=max_size` 범위로 보정됩니다.
    pub fn new(max_size: usize, trim_size: usize) -> Self {
        let (max_size, trim_size) = normalize_limits(max_size, trim_size);
        Self {
            inner: Mutex::new(Inner {
                records: VecDeque::with_capacity(max_size.min(10_000)),
                max_size,
                trim_size,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // 잠금 구간에는 패닉할 코드가 없지만, 오염되더라도 데이터는 일관적임
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 원시 라인들을 파싱하여 순서대로 추가합니다.
    pub fn append<S: AsRef<str>>(&self, lines: &[S]) -> AppendOutcome {
        let records = lines.iter().map(|l| LogRecord::parse(l.as_ref())).collect();
        self.append_records(records)
    }

    /// 파싱된 레코드들을 순서대로 추가하고 한 번에 트림합니다.
    ///
    /// 배치 전체가 하나의 잠금 구간에서 적용되므로 스냅샷은 배치의
    /// 일부만 반영된 상태를 관찰하지 않습니다.
    pub fn append_records(&self, records: Vec<LogRecord>) -> AppendOutcome {
        if records.is_empty() {
            return AppendOutcome {
                fill_level: self.len(),
                ..AppendOutcome::default()
            };
        }

        let appended = records.len();
        let (trimmed, fill_level) = {
            let mut inner = self.lock();
            inner.records.extend(records);
            let trimmed = inner.enforce_capacity();
            (trimmed, inner.records.len())
        };

        counter!(m::BUFFER_LINES_APPENDED_TOTAL).increment(appended as u64);
        if trimmed > 0 {
            counter!(m::BUFFER_TRIMS_TOTAL).increment(1);
            tracing::debug!(trimmed, fill_level, "buffer trimmed");
        }
        gauge!(m::BUFFER_FILL_LEVEL).set(fill_level as f64);

        AppendOutcome {
            appended,
            trimmed,
            fill_level,
        }
    }

    /// 현재 내용의 복사본과 용량 정보를 반환합니다.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            records: inner.records.iter().cloned().collect(),
            fill_level: inner.records.len(),
            max_size: inner.max_size,
        }
    }

    /// 용량 설정을 변경합니다 (설정 재로드).
    ///
    /// 새 용량보다 많은 레코드가 있으면 즉시 트림합니다.
    pub fn reconfigure(&self, max_size: usize, trim_size: usize) -> usize {
        let (max_size, trim_size) = normalize_limits(max_size, trim_size);
        let mut inner = self.lock();
        inner.max_size = max_size;
        inner.trim_size = trim_size;
        inner.enforce_capacity()
    }

    /// 현재 레코드 수
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// 버퍼가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 최대 용량
    pub fn max_size(&self) -> usize {
        self.lock().max_size
    }

    /// 트림 크기
    pub fn trim_size(&self) -> usize {
        self.lock().trim_size
    }
}

fn normalize_limits(max_size: usize, trim_size: usize) -> (usize, usize) {
    let max_size = max_size.max(1);
    (max_size, trim_size.clamp(1, max_size))
}
