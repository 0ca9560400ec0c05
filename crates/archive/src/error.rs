//! 아카이브 검색 에러 타입

use std::path::PathBuf;

use logharbor_core::error::LogharborError;

/// 아카이브 검색 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// 질의 시각을 해석할 수 없음
    #[error("invalid query time '{value}'")]
    InvalidTime { value: String },

    /// 로그 디렉토리를 읽을 수 없음
    #[error("cannot list {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 로그 파일 경로가 올바르지 않음
    #[error("invalid log file path {path}")]
    LogPath { path: PathBuf },
}

impl From<ArchiveError> for LogharborError {
    fn from(err: ArchiveError) -> Self {
        LogharborError::Archive(err.to_string())
    }
}
