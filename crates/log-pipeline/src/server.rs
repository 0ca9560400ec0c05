//! 라이브 조회 서버 — 유닉스 소켓 요청/응답
//!
//! 연결마다 별도 tokio 태스크에서 요청 하나를 읽고 응답 하나를 보낸 뒤 닫습니다.
//! 잘못된 요청이나 도중에 끊긴 연결은 해당 연결만 정리하고 서버는 계속 동작합니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio::net::{UnixListener, UnixStream};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logharbor_core::error::IpcError;
use logharbor_core::metrics as m;

use crate::buffer::LogBuffer;
use crate::error::LogPipelineError;
use crate::protocol::{self, LinesResponse, Request};

/// 요청 프레임 대기 상한
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// 라이브 조회 서버
pub struct QueryServer {
    socket_path: PathBuf,
    buffer: Arc<LogBuffer>,
    cancel: CancellationToken,
}

impl QueryServer {
    /// 새 서버를 생성합니다. 바인드는 [`run`](Self::run)에서 수행됩니다.
    pub fn new(
        socket_path: impl Into<PathBuf>,
        buffer: Arc<LogBuffer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            buffer,
            cancel,
        }
    }

    /// 소켓 경로
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// 소켓에 바인드하고 취소될 때까지 연결을 수락합니다.
    ///
    /// 이전 실행이 남긴 소켓 파일은 제거합니다. 종료 시 소켓 파일도 정리합니다.
    pub async fn run(self) -> Result<(), LogPipelineError> {
        let listener = self.bind()?;
        info!(socket = %self.socket_path.display(), "query server listening");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("query server received shutdown signal");
                    break;
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, _addr)) => {
                            let buffer = Arc::clone(&self.buffer);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, buffer).await {
                                    debug!(error = %e, "query connection ended with error");
                                }
                            });
                        }
                        Err(e) => {
                            // accept 실패는 일시적 (fd 고갈 등)
                            warn!(error = %e, "accept failed");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                        }
                    }
                }
            }
        }

        drop(listener);
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(socket = %self.socket_path.display(), error = %e, "failed to remove socket file");
            }
        }
        Ok(())
    }

    fn bind(&self) -> Result<UnixListener, LogPipelineError> {
        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => debug!(socket = %self.socket_path.display(), "removed stale socket"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LogPipelineError::Bind {
                    path: self.socket_path.clone(),
                    source: e,
                });
            }
        }

        if let Some(parent) = self.socket_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| LogPipelineError::Bind {
                    path: self.socket_path.clone(),
                    source: e,
                })?;
            }
        }

        UnixListener::bind(&self.socket_path).map_err(|e| LogPipelineError::Bind {
            path: self.socket_path.clone(),
            source: e,
        })
    }
}

/// 단일 연결을 처리합니다: 요청 하나 → 응답 하나 → 종료
async fn handle_connection(
    stream: UnixStream,
    buffer: Arc<LogBuffer>,
) -> Result<(), LogPipelineError> {
    let mut framed = Framed::new(stream, protocol::codec());

    let frame = match timeout(REQUEST_TIMEOUT, framed.next()).await {
        Ok(Some(Ok(frame))) => frame,
        Ok(Some(Err(e))) => {
            // 잘못된 프레임에도 같은 형태의 빈 응답을 시도
            let _ = framed
                .send(LinesResponse::empty(buffer.max_size()).encode()?)
                .await;
            return Err(IpcError::Frame(e.to_string()).into());
        }
        Ok(None) => return Err(IpcError::Closed.into()),
        Err(_) => {
            return Err(IpcError::Timeout {
                secs: REQUEST_TIMEOUT.as_secs(),
            }
            .into());
        }
    };

    let request = Request::decode(&frame);
    let response = respond(&request, &buffer);
    counter!(m::QUERY_REQUESTS_TOTAL, m::LABEL_REQUEST => request_label(&request)).increment(1);
    debug!(
        request = request.token(),
        lines = response.lines.len(),
        "query request served"
    );

    framed.send(response.encode()?).await?;
    Ok(())
}

/// 요청에 대한 응답을 만듭니다.
pub fn respond(request: &Request, buffer: &LogBuffer) -> LinesResponse {
    match request {
        Request::GetLines => buffer.snapshot().into(),
        Request::Unknown(_) => LinesResponse::empty(buffer.max_size()),
    }
}

fn request_label(request: &Request) -> &'static str {
    match request {
        Request::GetLines => "get_lines",
        Request::Unknown(_) => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respond_get_lines_returns_snapshot() {
        let buffer = LogBuffer::new(5, 2);
        buffer.append(&["a||h|f|s|p|1|one", "b||h|f|s|p|1|two"]);
        let resp = respond(&Request::GetLines, &buffer);
        assert_eq!(resp.lines.len(), 2);
        assert_eq!(resp.fill_level, 2);
        assert_eq!(resp.max_size, 5);
    }

    #[test]
    fn respond_unknown_returns_empty_shape() {
        let buffer = LogBuffer::new(5, 2);
        buffer.append(&["a||h|f|s|p|1|one"]);
        let resp = respond(&Request::Unknown("stats".to_owned()), &buffer);
        assert!(resp.lines.is_empty());
        assert_eq!(resp.fill_level, 0);
        assert_eq!(resp.max_size, 5);
    }
}
