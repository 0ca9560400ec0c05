//! 라이브 뷰 — 버퍼 스냅샷에 필터와 개수 제한을 적용
//!
//! 아카이브 검색과 같은 [`RecordFilter`]를 사용합니다. `total_rows`는 필터 적용 전
//! 스냅샷 크기이며, 필터 선택지는 전체 스냅샷에서 추출합니다.

use serde::{Deserialize, Serialize};

use logharbor_core::filter::{self, FilterOptions, LineLimit, RecordFilter};
use logharbor_core::record::LogRecord;

use crate::protocol::LinesResponse;

/// 라이브 조회 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveQuery {
    /// 필드 필터
    pub filter: RecordFilter,
    /// 요청한 결과 개수 (허용 목록 밖이면 기본값)
    pub num_lines: Option<usize>,
}

/// 라이브 조회 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveView {
    /// 필터를 통과한 최근 레코드 (오래된 것부터)
    pub rows: Vec<LogRecord>,
    /// 필터 적용 전 레코드 수
    pub total_rows: usize,
    /// 버퍼의 현재 레코드 수
    pub fill_level: usize,
    /// 버퍼 최대 용량
    pub max_size: usize,
    /// 실제 적용된 결과 개수
    pub num_lines: usize,
    /// 필터 선택지
    pub options: FilterOptions,
}

impl LiveQuery {
    /// 응답에 조건을 적용합니다.
    pub fn apply(&self, response: LinesResponse, limit: &LineLimit) -> LiveView {
        let num_lines = limit.resolve(self.num_lines);
        let total_rows = response.lines.len();
        let options = FilterOptions::from_records(&response.lines);
        let rows = filter::keep_last(self.filter.apply(response.lines), num_lines);

        LiveView {
            rows,
            total_rows,
            fill_level: response.fill_level,
            max_size: response.max_size,
            num_lines,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> LinesResponse {
        let lines = (1..=40)
            .map(|i| {
                let host = if i % 2 == 0 { "even" } else { "odd" };
                LogRecord::parse(&format!("t{i}||{host}|daemon|info|cron|{i}|job {i}"))
            })
            .collect();
        LinesResponse {
            lines,
            fill_level: 40,
            max_size: 2200,
        }
    }

    #[test]
    fn default_query_caps_to_default_lines() {
        let view = LiveQuery::default().apply(response(), &LineLimit::default());
        assert_eq!(view.num_lines, 30);
        assert_eq!(view.rows.len(), 30);
        assert_eq!(view.rows.last().unwrap().timestamp, "t40");
        assert_eq!(view.total_rows, 40);
    }

    #[test]
    fn filter_then_cap_keeps_most_recent() {
        let query = LiveQuery {
            filter: RecordFilter {
                host: Some("even".to_owned()),
                ..Default::default()
            },
            num_lines: Some(10),
        };
        let view = query.apply(response(), &LineLimit::default());
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.rows[0].timestamp, "t22");
        assert_eq!(view.rows[9].timestamp, "t40");
        assert_eq!(view.total_rows, 40, "total is counted before filtering");
    }

    #[test]
    fn invalid_num_lines_falls_back() {
        let query = LiveQuery {
            num_lines: Some(7),
            ..Default::default()
        };
        let view = query.apply(response(), &LineLimit::default());
        assert_eq!(view.num_lines, 30);
    }

    #[test]
    fn options_come_from_unfiltered_snapshot() {
        let query = LiveQuery {
            filter: RecordFilter {
                host: Some("odd".to_owned()),
                ..Default::default()
            },
            num_lines: None,
        };
        let view = query.apply(response(), &LineLimit::default());
        assert_eq!(view.options.hosts, vec!["even", "odd"]);
    }
}
