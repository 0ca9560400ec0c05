//! 레코드 필터 — 라이브/아카이브 조회가 공유하는 필터 조건
//!
//! [`RecordFilter`]는 호스트/퍼실리티/심각도/프로그램/PID 동등 비교와
//! 메시지 대소문자 무시 부분 문자열 비교를 담는 일시적 조회 객체입니다.
//! 빈 값(`None` 또는 빈 문자열)인 조건은 적용하지 않습니다.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::LogRecord;

/// 필드 필터 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// 호스트 동등 비교
    pub host: Option<String>,
    /// 퍼실리티 동등 비교
    pub facility: Option<String>,
    /// 심각도 동등 비교
    pub severity: Option<String>,
    /// 프로그램 동등 비교
    pub program: Option<String>,
    /// PID 동등 비교
    pub pid: Option<String>,
    /// 메시지 부분 문자열 (대소문자 무시)
    pub message: Option<String>,
}

impl RecordFilter {
    /// 조건이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        [
            &self.host,
            &self.facility,
            &self.severity,
            &self.program,
            &self.pid,
            &self.message,
        ]
        .iter()
        .all(|v| active(v).is_none())
    }

    /// 레코드가 모든 조건을 만족하는지 확인합니다.
    pub fn matches(&self, record: &LogRecord) -> bool {
        let eq = |cond: &Option<String>, value: &str| active(cond).is_none_or(|c| c == value);

        if !eq(&self.host, &record.host)
            || !eq(&self.facility, &record.facility)
            || !eq(&self.severity, &record.severity)
            || !eq(&self.program, &record.program)
            || !eq(&self.pid, &record.pid)
        {
            return false;
        }

        match active(&self.message) {
            Some(needle) => record
                .message
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// 조건을 만족하는 레코드만 순서를 유지하여 남깁니다.
    pub fn apply(&self, records: Vec<LogRecord>) -> Vec<LogRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// 필터 선택지 — 레코드 집합에서 추출한 필드별 고유값
///
/// 값은 정렬되어 있고 빈 문자열은 제외됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// 호스트 목록
    pub hosts: Vec<String>,
    /// 퍼실리티 목록
    pub facilities: Vec<String>,
    /// 심각도 목록
    pub severities: Vec<String>,
    /// 프로그램 목록
    pub programs: Vec<String>,
    /// PID 목록
    pub pids: Vec<String>,
}

impl FilterOptions {
    /// 레코드 집합에서 필터 선택지를 추출합니다.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> Self {
        let mut hosts = BTreeSet::new();
        let mut facilities = BTreeSet::new();
        let mut severities = BTreeSet::new();
        let mut programs = BTreeSet::new();
        let mut pids = BTreeSet::new();

        for r in records {
            insert_non_empty(&mut hosts, &r.host);
            insert_non_empty(&mut facilities, &r.facility);
            insert_non_empty(&mut severities, &r.severity);
            insert_non_empty(&mut programs, &r.program);
            insert_non_empty(&mut pids, &r.pid);
        }

        Self {
            hosts: hosts.into_iter().collect(),
            facilities: facilities.into_iter().collect(),
            severities: severities.into_iter().collect(),
            programs: programs.into_iter().collect(),
            pids: pids.into_iter().collect(),
        }
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    if !value.is_empty() && !set.contains(value) {
        set.insert(value.to_owned());
    }
}

/// 결과 개수 상한 — 허용된 값 집합 중 하나로 제한됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLimit {
    /// 허용된 값 목록
    pub options: Vec<usize>,
    /// 요청 값이 허용되지 않을 때 사용할 기본값
    pub default: usize,
}

impl LineLimit {
    /// 새 상한 규칙을 생성합니다.
    pub fn new(options: Vec<usize>, default: usize) -> Self {
        Self { options, default }
    }

    /// 요청 값을 허용된 값으로 정규화합니다.
    ///
    /// 값이 없거나 허용 목록에 없으면 기본값을 반환합니다.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if self.options.contains(&n) => n,
            _ => self.default,
        }
    }
}

impl Default for LineLimit {
    fn default() -> Self {
        Self {
            options: vec![10, 20, 30, 40, 50, 60, 80, 100],
            default: 30,
        }
    }
}

/// 가장 최근 `n`개만 남깁니다 (순서 유지).
pub fn keep_last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    if items.len() > n {
        items.drain(..items.len() - n);
    }
    items
}
