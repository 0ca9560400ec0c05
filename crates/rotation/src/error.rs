//! 로테이션 에러 타입
//!
//! [`RotationError`]는 `From<RotationError> for LogharborError`로 상위 에러로 변환됩니다.

use std::path::PathBuf;

use logharbor_core::error::LogharborError;

/// 로테이션 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// 라이브 파일에서 유효한 타임스탬프를 찾지 못함
    #[error("no valid timestamp in {path}")]
    NoTimestamps { path: PathBuf },

    /// 라이브 파일 이름 변경 실패
    #[error("rename {from} -> {to} failed: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// gzip 압축 실패
    #[error("compress {path} failed: {source}")]
    Compress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 재오픈 명령 실패
    #[error("reopen command '{command}' failed: {reason}")]
    Reopen { command: String, reason: String },

    /// 블로킹 작업 태스크 실패
    #[error("blocking task failed: {0}")]
    Task(String),

    /// 파일 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RotationError> for LogharborError {
    fn from(err: RotationError) -> Self {
        match err {
            RotationError::Io(e) => LogharborError::Io(e),
            other => LogharborError::Rotation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_top_level_error() {
        let err: LogharborError = RotationError::NoTimestamps {
            path: PathBuf::from("/var/log/messages"),
        }
        .into();
        assert!(matches!(err, LogharborError::Rotation(_)));
        assert!(err.to_string().contains("/var/log/messages"));
    }

    #[test]
    fn io_stays_io() {
        let err: LogharborError =
            RotationError::Io(std::io::Error::other("disk gone")).into();
        assert!(matches!(err, LogharborError::Io(_)));
    }
}
