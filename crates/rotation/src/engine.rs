//! 로테이션 엔진
//!
//! [`RotationEngine::run`]은 `check_interval`마다 정책을 평가하고 필요하면
//! [`RotationEngine::rotate`]를 수행합니다. 단계별 실패는 기록 후 다음 단계로 넘어가며,
//! 루프는 어떤 실패로도 종료되지 않습니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use chrono::Utc;
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use logharbor_core::archive_name;
use logharbor_core::config::LogharborConfig;
use logharbor_core::control::RestartSignal;
use logharbor_core::metrics as m;
use logharbor_core::timestamp;

use crate::compress;
use crate::error::RotationError;
use crate::policy::{self, RotationPolicy, RotationTrigger};
use crate::reopen::UpstreamReopen;
use crate::retention::{self, RetentionPolicy, RetentionReport};

/// 엔진 설정
#[derive(Debug, Clone)]
pub struct RotationSettings {
    /// 라이브 로그 파일
    pub log_file: PathBuf,
    pub check_interval: Duration,
    pub policy: RotationPolicy,
    pub reopen: UpstreamReopen,
    /// `None`이면 보존 정책을 적용하지 않음
    pub retention: Option<RetentionPolicy>,
}

impl RotationSettings {
    pub fn from_config(config: &LogharborConfig) -> Self {
        Self {
            log_file: config.paths.log_file.clone(),
            check_interval: Duration::from_secs(config.rotation.check_interval_secs),
            policy: RotationPolicy::from_config(&config.rotation),
            reopen: UpstreamReopen::from_config(&config.rotation),
            retention: RetentionPolicy::from_config(&config.retention),
        }
    }
}

/// 로테이션 한 회의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    pub trigger: RotationTrigger,
    /// 최종 아카이브 경로 (압축 실패 시 이름만 바뀐 파일)
    pub archive: PathBuf,
    pub compressed: bool,
    pub reopened: bool,
    pub retention: Option<RetentionReport>,
    pub restart_signaled: bool,
}

/// 로테이션 엔진
pub struct RotationEngine {
    settings: RotationSettings,
    signal: Arc<dyn RestartSignal>,
}

impl RotationEngine {
    pub fn new(settings: RotationSettings, signal: Arc<dyn RestartSignal>) -> Self {
        Self { settings, signal }
    }

    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// 취소될 때까지 주기적으로 검사합니다.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.settings.check_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(
            path = %self.settings.log_file.display(),
            interval_secs = self.settings.check_interval.as_secs(),
            "rotation engine started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("rotation engine received shutdown signal");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.check_once().await {
                        error!(error = %e, "exception during log rotation");
                    }
                }
            }
        }
    }

    /// 정책을 한 번 평가하고 필요하면 로테이션합니다.
    pub async fn check_once(&self) -> Result<Option<RotationOutcome>, RotationError> {
        let path = self.settings.log_file.clone();
        let policy = self.settings.policy;
        let offset = timestamp::local_offset_minutes();

        let trigger = blocking(move || policy::should_rotate(&path, &policy, Utc::now(), offset))
            .await??;
        let Some(trigger) = trigger else {
            debug!("no rotation needed");
            return Ok(None);
        };
        match self.rotate(trigger).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(RotationError::NoTimestamps { path }) => {
                warn!(path = %path.display(), %trigger, "no valid timestamp in live log, skipping rotation");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// 정책과 무관하게 즉시 로테이션합니다.
    pub async fn force_rotate(&self) -> Result<RotationOutcome, RotationError> {
        self.rotate(RotationTrigger::Forced).await
    }

    /// 로테이션 절차를 수행합니다.
    ///
    /// 이름 변경 전 단계(범위 수집, 이름 변경)의 실패만 에러로 반환합니다.
    pub async fn rotate(&self, trigger: RotationTrigger) -> Result<RotationOutcome, RotationError> {
        let started = Instant::now();
        let result = self.rotate_inner(trigger).await;
        let label = match &result {
            Ok(_) => "success",
            Err(RotationError::NoTimestamps { .. }) => "skipped",
            Err(_) => "failure",
        };
        counter!(m::ROTATION_ROTATIONS_TOTAL, m::LABEL_RESULT => label).increment(1);
        histogram!(m::ROTATION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        result
    }

    async fn rotate_inner(&self, trigger: RotationTrigger) -> Result<RotationOutcome, RotationError> {
        let log_file = self.settings.log_file.clone();

        // 1. 이름 변경
        let renamed = blocking(move || rename_live_file(&log_file)).await??;
        info!(
            from = %self.settings.log_file.display(),
            to = %renamed.display(),
            %trigger,
            "rotated live log"
        );

        // 2. 상위 작성자 재오픈
        let reopened = match self.settings.reopen.run().await {
            Ok(()) => self.settings.reopen.is_configured(),
            Err(e) => {
                error!(error = %e, "reopen failed");
                false
            }
        };

        // 3. 압축
        let target = renamed.clone();
        let (archive, compressed) = match blocking(move || compress::gzip_file(&target)).await {
            Ok(Ok(gz)) => (gz, true),
            Ok(Err(e)) | Err(e) => {
                error!(path = %renamed.display(), error = %e, "failed to gzip rotated log");
                (renamed, false)
            }
        };

        // 4. 보존 정책
        let retention = match self.settings.retention {
            Some(policy) => self.enforce_retention(policy).await,
            None => None,
        };

        // 5. 테일러 재시작 신호
        let restart_signaled = match self.signal.request_restart() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not signal tailer restart");
                false
            }
        };

        Ok(RotationOutcome {
            trigger,
            archive,
            compressed,
            reopened,
            retention,
            restart_signaled,
        })
    }

    async fn enforce_retention(&self, policy: RetentionPolicy) -> Option<RetentionReport> {
        let Some((dir, base)) = split_log_path(&self.settings.log_file) else {
            warn!(path = %self.settings.log_file.display(), "log file has no file name, skipping retention");
            return None;
        };
        match blocking(move || retention::enforce(&dir, &base, &policy, SystemTime::now())).await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                error!(error = %e, "retention failed");
                None
            }
            Err(e) => {
                error!(error = %e, "retention failed");
                None
            }
        }
    }
}

/// 라이브 파일을 `<name>.<시작>-to-<끝>`으로 이름을 바꿉니다.
fn rename_live_file(log_file: &Path) -> Result<PathBuf, RotationError> {
    let range = policy::scan_date_range(log_file)?.ok_or_else(|| RotationError::NoTimestamps {
        path: log_file.to_path_buf(),
    })?;
    let (dir, base) = split_log_path(log_file).ok_or_else(|| RotationError::NoTimestamps {
        path: log_file.to_path_buf(),
    })?;

    let target = dir.join(archive_name::rotated_file_name(
        &base,
        &range.earliest,
        &range.latest,
    ));
    std::fs::rename(log_file, &target).map_err(|source| RotationError::Rename {
        from: log_file.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    Ok(target)
}

/// 로그 파일 경로를 (디렉토리, 파일명)으로 나눕니다.
pub fn split_log_path(log_file: &Path) -> Option<(PathBuf, String)> {
    let base = log_file.file_name()?.to_str()?.to_owned();
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, base))
}

/// 블로킹 작업을 실행합니다. 태스크 실패는 [`RotationError::Task`]입니다.
async fn blocking<T, F>(f: F) -> Result<T, RotationError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RotationError::Task(e.to_string()))
}
