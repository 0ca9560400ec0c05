//! 라이브 조회 클라이언트
//!
//! [`LiveClient::fetch`]는 실패를 에러로 돌려주고,
//! [`LiveClient::fetch_or_fallback`]은 실패 시에도 올바른 형태의 응답을 돌려줍니다.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, error};

use logharbor_core::error::IpcError;

use crate::protocol::{self, LinesResponse, Request};

/// 라이브 조회 클라이언트
#[derive(Debug, Clone)]
pub struct LiveClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl LiveClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    /// 소켓 경로
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// 버퍼 스냅샷을 요청합니다.
    pub async fn fetch(&self) -> Result<LinesResponse, IpcError> {
        self.request(&Request::GetLines).await
    }

    /// 버퍼 스냅샷을 요청하고, 실패하면 대체 응답을 반환합니다.
    pub async fn fetch_or_fallback(&self) -> LinesResponse {
        match self.fetch().await {
            Ok(resp) => {
                debug!(
                    fill_level = resp.fill_level,
                    max_size = resp.max_size,
                    "fetched live buffer"
                );
                resp
            }
            Err(e) => {
                error!(socket = %self.socket_path.display(), error = %e, "live query failed");
                LinesResponse::fallback(&e)
            }
        }
    }

    /// 임의의 요청을 보내고 응답을 받습니다. 전체 왕복에 타임아웃이 적용됩니다.
    pub async fn request(&self, request: &Request) -> Result<LinesResponse, IpcError> {
        let secs = self.timeout.as_secs().max(1);
        timeout(self.timeout, self.round_trip(request))
            .await
            .map_err(|_| IpcError::Timeout { secs })?
    }

    async fn round_trip(&self, request: &Request) -> Result<LinesResponse, IpcError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| IpcError::Connect {
                path: self.socket_path.display().to_string(),
                reason: e.to_string(),
            })?;
        let mut framed = Framed::new(stream, protocol::codec());

        framed
            .send(request.encode()?)
            .await
            .map_err(|e| IpcError::Frame(e.to_string()))?;

        match framed.next().await {
            Some(Ok(frame)) => LinesResponse::decode(&frame),
            Some(Err(e)) => Err(IpcError::Frame(e.to_string())),
            None => Err(IpcError::Closed),
        }
    }
}
