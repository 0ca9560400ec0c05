//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 버퍼, 테일러, 조회 서버/클라이언트에서 발생하는 에러를 표현합니다.
//! `From<LogPipelineError> for LogharborError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use std::path::PathBuf;

use logharbor_core::error::{IpcError, LogharborError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 파일 감시 설정 실패
    #[error("watch error: {path}: {reason}")]
    Watch {
        /// 감시 대상 경로
        path: PathBuf,
        /// 실패 사유
        reason: String,
    },

    /// 라이브 로그 파일 읽기 실패
    #[error("read error: {path}: {source}")]
    Read {
        /// 읽던 파일 경로
        path: PathBuf,
        /// 원인
        #[source]
        source: std::io::Error,
    },

    /// 유닉스 소켓 바인드 실패
    #[error("bind error: {path}: {source}")]
    Bind {
        /// 소켓 경로
        path: PathBuf,
        /// 원인
        #[source]
        source: std::io::Error,
    },

    /// 테일러가 이미 종료되어 제어 요청을 받을 수 없음
    #[error("tailer is not running")]
    TailerStopped,

    /// 로컬 IPC 에러
    #[error(transparent)]
    Ipc(#[from] IpcError),

    /// JSON 직렬화 에러
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for LogharborError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Ipc(e) => LogharborError::Ipc(e),
            LogPipelineError::Io(e) => LogharborError::Io(e),
            LogPipelineError::TailerStopped => {
                LogharborError::Channel("tailer is not running".to_owned())
            }
            other => LogharborError::Io(std::io::Error::other(other.to_string())),
        }
    }
}
