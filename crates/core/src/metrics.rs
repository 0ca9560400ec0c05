//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 레코더가 설치되지 않았다면
//! 매크로 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logharbor_`
//! - 컴포넌트명: `buffer_`, `tailer_`, `query_`, `rotation_`, `retention_`, `archive_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logharbor_core::metrics::BUFFER_LINES_APPENDED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure, skipped)
pub const LABEL_RESULT: &str = "result";

/// 보존 정책 단계 레이블 키 (count, size, age)
pub const LABEL_PASS: &str = "pass";

/// 조회 요청 종류 레이블 키 (get_lines, unknown)
pub const LABEL_REQUEST: &str = "request";

// ─── LogBuffer 메트릭 ──────────────────────────────────────────────

/// Buffer: 추가된 레코드 수 (counter)
pub const BUFFER_LINES_APPENDED_TOTAL: &str = "logharbor_buffer_lines_appended_total";

/// Buffer: 일괄 트림 횟수 (counter)
pub const BUFFER_TRIMS_TOTAL: &str = "logharbor_buffer_trims_total";

/// Buffer: 현재 레코드 수 (gauge)
pub const BUFFER_FILL_LEVEL: &str = "logharbor_buffer_fill_level";

// ─── Tailer 메트릭 ─────────────────────────────────────────────────

/// Tailer: 감시 재시작 횟수 (counter)
pub const TAILER_RESTARTS_TOTAL: &str = "logharbor_tailer_restarts_total";

/// Tailer: 읽기 실패 횟수 (counter)
pub const TAILER_READ_ERRORS_TOTAL: &str = "logharbor_tailer_read_errors_total";

// ─── Query Server 메트릭 ───────────────────────────────────────────

/// Query: 처리한 요청 수 (counter, label: request)
pub const QUERY_REQUESTS_TOTAL: &str = "logharbor_query_requests_total";

// ─── Rotation / Retention 메트릭 ───────────────────────────────────

/// Rotation: 로테이션 시도 수 (counter, label: result)
pub const ROTATION_ROTATIONS_TOTAL: &str = "logharbor_rotation_rotations_total";

/// Rotation: 로테이션 한 회에 걸린 시간 (histogram, 초)
pub const ROTATION_DURATION_SECONDS: &str = "logharbor_rotation_duration_seconds";

/// Retention: 삭제된 아카이브 수 (counter, label: pass)
pub const RETENTION_DELETIONS_TOTAL: &str = "logharbor_retention_deletions_total";

// ─── Archive Search 메트릭 ─────────────────────────────────────────

/// Archive: 검색 요청 수 (counter)
pub const ARCHIVE_SEARCHES_TOTAL: &str = "logharbor_archive_searches_total";

// ─── Daemon 메트릭 ─────────────────────────────────────────────────

/// Daemon: 설정 재로드 횟수 (counter, label: result)
pub const DAEMON_RELOADS_TOTAL: &str = "logharbor_daemon_reloads_total";

/// Daemon: 빌드 정보 (gauge, 항상 1)
pub const DAEMON_BUILD_INFO: &str = "logharbor_daemon_build_info";

// ─── 히스토그램 버킷 정의 ──────────────────────────────────────────

/// 로테이션 소요 시간 버킷 (초)
pub const ROTATION_DURATION_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 60.0];

/// 모든 메트릭 이름 목록
pub const ALL_METRIC_NAMES: &[&str] = &[
    BUFFER_LINES_APPENDED_TOTAL,
    BUFFER_TRIMS_TOTAL,
    BUFFER_FILL_LEVEL,
    TAILER_RESTARTS_TOTAL,
    TAILER_READ_ERRORS_TOTAL,
    QUERY_REQUESTS_TOTAL,
    ROTATION_ROTATIONS_TOTAL,
    ROTATION_DURATION_SECONDS,
    RETENTION_DELETIONS_TOTAL,
    ARCHIVE_SEARCHES_TOTAL,
    DAEMON_RELOADS_TOTAL,
    DAEMON_BUILD_INFO,
];

// ─── 설명 등록 함수 ────────────────────────────────────────────────

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Buffer
    describe_counter!(
        BUFFER_LINES_APPENDED_TOTAL,
        "Total number of records appended to the live buffer"
    );
    describe_counter!(
        BUFFER_TRIMS_TOTAL,
        "Total number of bulk trims performed on the live buffer"
    );
    describe_gauge!(
        BUFFER_FILL_LEVEL,
        "Current number of records held in the live buffer"
    );

    // Tailer
    describe_counter!(
        TAILER_RESTARTS_TOTAL,
        "Total number of tailer watch restarts (rotation or explicit request)"
    );
    describe_counter!(
        TAILER_READ_ERRORS_TOTAL,
        "Total number of failed reads of the live log file"
    );

    // Query
    describe_counter!(
        QUERY_REQUESTS_TOTAL,
        "Total number of live query requests served"
    );

    // Rotation / Retention
    describe_counter!(
        ROTATION_ROTATIONS_TOTAL,
        "Total number of rotation attempts by result"
    );
    describe_histogram!(
        ROTATION_DURATION_SECONDS,
        "Time to rotate, compress and prune in seconds"
    );
    describe_counter!(
        RETENTION_DELETIONS_TOTAL,
        "Total number of archives deleted by retention pass"
    );

    // Archive
    describe_counter!(
        ARCHIVE_SEARCHES_TOTAL,
        "Total number of archive searches executed"
    );

    // Daemon
    describe_counter!(
        DAEMON_RELOADS_TOTAL,
        "Total number of configuration reloads by result"
    );
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (version label, always 1)"
    );
}
