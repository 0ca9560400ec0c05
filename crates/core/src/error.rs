//! 에러 타입 — 도메인별 에러 정의

/// Logharbor 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogharborError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 레코드/타임스탬프 에러
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// 로컬 IPC 에러
    #[error("ipc error: {0}")]
    Ipc(#[from] IpcError),

    /// 로테이션/보존 정책 에러
    #[error("rotation error: {0}")]
    Rotation(String),

    /// 아카이브 검색 에러
    #[error("archive error: {0}")]
    Archive(String),

    /// 워커 간 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 필수 설정 값 누락
    #[error("missing required config value '{field}'")]
    MissingValue { field: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 레코드 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// 타임스탬프 파싱 실패
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    /// 아카이브 파일명에서 시간 범위를 읽을 수 없음
    #[error("unparseable archive name '{name}'")]
    ArchiveName { name: String },
}

/// 로컬 IPC 에러
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// 소켓 연결 실패
    #[error("connect to {path} failed: {reason}")]
    Connect { path: String, reason: String },

    /// 프레임 인코딩/디코딩 실패
    #[error("malformed frame: {0}")]
    Frame(String),

    /// 응답 대기 시간 초과
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// 상대측이 응답 없이 연결을 종료함
    #[error("connection closed before response")]
    Closed,
}
