//! 설정 관리 — logharbor.toml 파싱 및 런타임 설정
//!
//! [`LogharborConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGHARBOR_BUFFER_MAX_SIZE=5000` 형식)
//! 3. 설정 파일 (`logharbor.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logharbor_core::error::LogharborError> {
//! use logharbor_core::config::LogharborConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogharborConfig::load("logharbor.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogharborConfig::parse("[buffer]\nmax_size = 5000")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogharborError};
use crate::filter::LineLimit;

/// Logharbor 통합 설정
///
/// `logharbor.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 컴포넌트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogharborConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 파일/소켓 경로
    #[serde(default)]
    pub paths: PathsConfig,
    /// 라이브 버퍼 설정
    #[serde(default)]
    pub buffer: BufferConfig,
    /// 테일러 설정
    #[serde(default)]
    pub tailer: TailerConfig,
    /// 로테이션 설정
    #[serde(default)]
    pub rotation: RotationConfig,
    /// 보존 정책 설정
    #[serde(default)]
    pub retention: RetentionConfig,
    /// 조회 설정
    #[serde(default)]
    pub query: QueryConfig,
    /// 메트릭 엔드포인트 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogharborConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 및 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogharborError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogharborError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogharborError> {
        toml::from_str(toml_str).map_err(|e| {
            LogharborError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGHARBOR_{SECTION}_{FIELD}`
    /// 예: `LOGHARBOR_PATHS_LOG_FILE=/var/log/messages`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGHARBOR_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGHARBOR_GENERAL_LOG_FORMAT");
        override_path(&mut self.general.pid_file, "LOGHARBOR_GENERAL_PID_FILE");

        // Paths
        override_path(&mut self.paths.log_file, "LOGHARBOR_PATHS_LOG_FILE");
        override_path(&mut self.paths.socket_path, "LOGHARBOR_PATHS_SOCKET_PATH");

        // Buffer
        override_usize(&mut self.buffer.max_size, "LOGHARBOR_BUFFER_MAX_SIZE");
        override_usize(&mut self.buffer.trim_size, "LOGHARBOR_BUFFER_TRIM_SIZE");
        override_usize(
            &mut self.buffer.initial_lines,
            "LOGHARBOR_BUFFER_INITIAL_LINES",
        );

        // Tailer
        override_u64(
            &mut self.tailer.poll_interval_ms,
            "LOGHARBOR_TAILER_POLL_INTERVAL_MS",
        );

        // Rotation
        override_bool(&mut self.rotation.enabled, "LOGHARBOR_ROTATION_ENABLED");
        override_u64(
            &mut self.rotation.check_interval_secs,
            "LOGHARBOR_ROTATION_CHECK_INTERVAL_SECS",
        );
        override_u32(
            &mut self.rotation.max_age_days,
            "LOGHARBOR_ROTATION_MAX_AGE_DAYS",
        );
        override_u64(
            &mut self.rotation.max_size_mb,
            "LOGHARBOR_ROTATION_MAX_SIZE_MB",
        );
        override_words(
            &mut self.rotation.reopen_command,
            "LOGHARBOR_ROTATION_REOPEN_COMMAND",
        );
        override_u64(
            &mut self.rotation.reopen_timeout_secs,
            "LOGHARBOR_ROTATION_REOPEN_TIMEOUT_SECS",
        );

        // Retention
        override_bool(
            &mut self.retention.delete_oldest,
            "LOGHARBOR_RETENTION_DELETE_OLDEST",
        );
        override_usize(&mut self.retention.min_count, "LOGHARBOR_RETENTION_MIN_COUNT");
        override_u64(
            &mut self.retention.total_max_mb,
            "LOGHARBOR_RETENTION_TOTAL_MAX_MB",
        );
        override_u32(&mut self.retention.max_days, "LOGHARBOR_RETENTION_MAX_DAYS");

        // Query
        override_usize_csv(
            &mut self.query.num_lines_options,
            "LOGHARBOR_QUERY_NUM_LINES_OPTIONS",
        );
        override_usize(
            &mut self.query.default_num_lines,
            "LOGHARBOR_QUERY_DEFAULT_NUM_LINES",
        );
        override_u64(
            &mut self.query.client_timeout_secs,
            "LOGHARBOR_QUERY_CLIENT_TIMEOUT_SECS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGHARBOR_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "LOGHARBOR_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "LOGHARBOR_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 필수 경로 누락은 [`ConfigError::MissingValue`], 범위를 벗어난 값은
    /// [`ConfigError::InvalidValue`]로 보고됩니다.
    pub fn validate(&self) -> Result<(), LogharborError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.paths.log_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "paths.log_file".to_owned(),
            }
            .into());
        }
        if self.paths.log_file.file_name().is_none() {
            return Err(invalid("paths.log_file", "must name a file".to_owned()));
        }
        if self.paths.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "paths.socket_path".to_owned(),
            }
            .into());
        }

        if self.buffer.max_size == 0 {
            return Err(invalid("buffer.max_size", "must be at least 1".to_owned()));
        }
        if self.buffer.trim_size == 0 || self.buffer.trim_size > self.buffer.max_size {
            return Err(invalid(
                "buffer.trim_size",
                format!("must be between 1 and max_size ({})", self.buffer.max_size),
            ));
        }

        if self.tailer.poll_interval_ms == 0 {
            return Err(invalid(
                "tailer.poll_interval_ms",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.rotation.enabled {
            if self.rotation.check_interval_secs == 0 {
                return Err(invalid(
                    "rotation.check_interval_secs",
                    "must be greater than 0".to_owned(),
                ));
            }
            if self.rotation.reopen_timeout_secs == 0 {
                return Err(invalid(
                    "rotation.reopen_timeout_secs",
                    "must be greater than 0".to_owned(),
                ));
            }
        }

        if self.query.num_lines_options.is_empty() {
            return Err(invalid(
                "query.num_lines_options",
                "must contain at least one value".to_owned(),
            ));
        }
        if self.query.num_lines_options.contains(&0) {
            return Err(invalid(
                "query.num_lines_options",
                "values must be greater than 0".to_owned(),
            ));
        }
        if !self
            .query
            .num_lines_options
            .contains(&self.query.default_num_lines)
        {
            return Err(invalid(
                "query.default_num_lines",
                "must be one of query.num_lines_options".to_owned(),
            ));
        }
        if self.query.client_timeout_secs == 0 {
            return Err(invalid(
                "query.client_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid(
                "metrics.port",
                "must be non-zero when metrics are enabled".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> LogharborError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데몬 PID 파일 경로
    pub pid_file: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: PathBuf::from("/run/logharbor.pid"),
        }
    }
}

/// 파일/소켓 경로 설정
///
/// 두 경로 모두 필수입니다. 아카이브는 `log_file`과 같은 디렉토리에 생성됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// syslog 데몬이 기록하는 라이브 로그 파일
    pub log_file: PathBuf,
    /// Query Server 유닉스 소켓 경로
    pub socket_path: PathBuf,
}

impl PathsConfig {
    /// 라이브 로그 파일이 위치한 디렉토리 (아카이브 디렉토리)
    pub fn log_dir(&self) -> PathBuf {
        match self.log_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("/var/log/logharbor/messages"),
            socket_path: PathBuf::from("/tmp/logbuffer.sock"),
        }
    }
}

/// 라이브 버퍼 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// 최대 레코드 수
    pub max_size: usize,
    /// 용량 초과 시 한 번에 제거할 레코드 수
    pub trim_size: usize,
    /// 파일을 처음 발견했을 때 미리 읽을 마지막 라인 수
    pub initial_lines: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_size: 2200,
            trim_size: 200,
            initial_lines: 30,
        }
    }
}

/// 테일러 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailerConfig {
    /// 파일이 없을 때 존재 여부를 확인하는 주기 (밀리초)
    pub poll_interval_ms: u64,
}

impl TailerConfig {
    /// 폴링 주기를 `Duration`으로 반환합니다.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

/// 로테이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// 주기적 로테이션 검사 활성화 여부
    pub enabled: bool,
    /// 검사 주기 (초)
    pub check_interval_secs: u64,
    /// 가장 오래된 라인이 이 일수보다 오래되면 로테이션
    pub max_age_days: u32,
    /// 파일 크기가 이 값(MB)을 넘으면 로테이션
    pub max_size_mb: u64,
    /// syslog 데몬에 출력 파일 재오픈을 지시하는 명령 (argv)
    pub reopen_command: Vec<String>,
    /// 재오픈 명령 대기 상한 (초)
    pub reopen_timeout_secs: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 300,
            max_age_days: 30,
            max_size_mb: 100,
            reopen_command: vec!["/usr/sbin/syslog-ng-ctl".to_owned(), "reopen".to_owned()],
            reopen_timeout_secs: 10,
        }
    }
}

/// 아카이브 보존 정책 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// 로테이션 후 보존 정책 적용 여부
    pub delete_oldest: bool,
    /// 개수 기준: 이 개수를 초과하면 오래된 것부터 삭제
    pub min_count: usize,
    /// 크기 기준: 아카이브 총합(MB)이 이 값을 넘으면 오래된 것부터 삭제
    pub total_max_mb: u64,
    /// 나이 기준: 수정 시각이 이 일수보다 오래된 아카이브 삭제
    pub max_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            delete_oldest: true,
            min_count: 20,
            total_max_mb: 500,
            max_days: 60,
        }
    }
}

/// 조회 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 허용된 결과 개수 값
    pub num_lines_options: Vec<usize>,
    /// 기본 결과 개수
    pub default_num_lines: usize,
    /// 라이브 조회 클라이언트 타임아웃 (초)
    pub client_timeout_secs: u64,
}

impl QueryConfig {
    /// 결과 개수 상한 규칙을 생성합니다.
    pub fn line_limit(&self) -> LineLimit {
        LineLimit::new(self.num_lines_options.clone(), self.default_num_lines)
    }

    /// 클라이언트 타임아웃을 `Duration`으로 반환합니다.
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let limit = LineLimit::default();
        Self {
            num_lines_options: limit.options,
            default_num_lines: limit.default,
            client_timeout_secs: 5,
        }
    }
}

/// Prometheus 메트릭 엔드포인트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9107,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_path(target: &mut PathBuf, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = PathBuf::from(val);
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str, type_name: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = type_name,
                "failed to parse env var, ignoring"
            ),
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key, "bool");
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key, "usize");
}

fn override_u16(target: &mut u16, env_key: &str) {
    override_parsed(target, env_key, "u16");
}

fn override_u32(target: &mut u32, env_key: &str) {
    override_parsed(target, env_key, "u32");
}

fn override_u64(target: &mut u64, env_key: &str) {
    override_parsed(target, env_key, "u64");
}

/// 공백으로 구분된 argv (예: `"/usr/sbin/syslog-ng-ctl reopen"`)
fn override_words(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split_whitespace().map(str::to_owned).collect();
    }
}

fn override_usize_csv(target: &mut Vec<usize>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let parsed: Result<Vec<usize>, _> =
            val.split(',').map(|s| s.trim().parse::<usize>()).collect();
        match parsed {
            Ok(values) => *target = values,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse comma-separated integers from env var, ignoring"
            ),
        }
    }
}
