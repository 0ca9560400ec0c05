//! 라이브 조회 프로토콜 — 길이 접두 JSON 프레임
//!
//! 연결마다 요청 하나와 응답 하나를 주고받습니다.
//!
//! ```text
//! client                         server
//!   | --[u32 BE len]["get_lines"]--> |
//!   | <--[u32 BE len]{lines,...}---- |
//!   x            close               x
//! ```
//!
//! 프레이밍은 `tokio_util::codec::LengthDelimitedCodec`(4바이트 빅엔디언 길이)을 사용합니다.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::codec::LengthDelimitedCodec;

use logharbor_core::error::IpcError;
use logharbor_core::record::LogRecord;

use crate::buffer::Snapshot;

/// 버퍼 내용을 요청하는 토큰
pub const GET_LINES: &str = "get_lines";

/// 프레임 최대 크기 (요청/응답 공통)
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// 프로토콜 코덱을 생성합니다.
pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

/// 해석된 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// 현재 버퍼 스냅샷 요청
    GetLines,
    /// 알 수 없는 요청 (원문 보존)
    Unknown(String),
}

impl Request {
    /// 요청 프레임을 해석합니다.
    ///
    /// JSON 문자열이 아니면 원문 바이트를 그대로 토큰으로 취급합니다.
    pub fn decode(frame: &[u8]) -> Self {
        let token = serde_json::from_slice::<String>(frame)
            .unwrap_or_else(|_| String::from_utf8_lossy(frame).into_owned());
        if token == GET_LINES {
            Self::GetLines
        } else {
            Self::Unknown(token)
        }
    }

    /// 요청 토큰 문자열
    pub fn token(&self) -> &str {
        match self {
            Self::GetLines => GET_LINES,
            Self::Unknown(token) => token,
        }
    }

    /// 요청 프레임을 인코딩합니다.
    pub fn encode(&self) -> Result<Bytes, IpcError> {
        serde_json::to_vec(self.token())
            .map(Bytes::from)
            .map_err(|e| IpcError::Frame(e.to_string()))
    }
}

/// 라이브 조회 응답
///
/// 실패 시에도 호출자는 항상 이 형태를 받습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesResponse {
    /// 삽입 순서의 레코드
    pub lines: Vec<LogRecord>,
    /// 버퍼의 현재 레코드 수
    pub fill_level: usize,
    /// 버퍼 최대 용량
    pub max_size: usize,
}

impl LinesResponse {
    /// 알 수 없는 요청에 대한 빈 응답
    pub fn empty(max_size: usize) -> Self {
        Self {
            lines: Vec::new(),
            fill_level: 0,
            max_size,
        }
    }

    /// 버퍼에 도달하지 못했을 때의 대체 응답
    ///
    /// 에러 메시지를 담은 합성 레코드 하나, `fill_level` 0, `max_size` 1.
    pub fn fallback(error: &dyn std::fmt::Display) -> Self {
        Self {
            lines: vec![LogRecord::error(format!("IPC error: {error}"))],
            fill_level: 0,
            max_size: 1,
        }
    }

    /// 응답 프레임을 인코딩합니다.
    pub fn encode(&self) -> Result<Bytes, IpcError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| IpcError::Frame(e.to_string()))
    }

    /// 응답 프레임을 해석합니다.
    pub fn decode(frame: &[u8]) -> Result<Self, IpcError> {
        serde_json::from_slice(frame).map_err(|e| IpcError::Frame(e.to_string()))
    }
}

impl From<Snapshot> for LinesResponse {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            lines: snapshot.records,
            fill_level: snapshot.fill_level,
            max_size: snapshot.max_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn get_lines_token_decodes() {
        let frame = Request::GetLines.encode().unwrap();
        assert_eq!(&frame[..], br#""get_lines""#);
        assert_eq!(Request::decode(&frame), Request::GetLines);
    }

    #[test]
    fn raw_token_is_accepted() {
        assert_eq!(Request::decode(b"get_lines"), Request::GetLines);
    }

    #[test]
    fn unknown_token_is_preserved() {
        let req = Request::decode(br#""get_everything""#);
        assert_eq!(req, Request::Unknown("get_everything".to_owned()));
        assert_eq!(req.token(), "get_everything");
    }

    #[test]
    fn empty_response_shape() {
        let resp = LinesResponse::empty(2200);
        assert!(resp.lines.is_empty());
        assert_eq!(resp.fill_level, 0);
        assert_eq!(resp.max_size, 2200);
    }

    #[test]
    fn fallback_response_carries_error_text() {
        let resp = LinesResponse::fallback(&IpcError::Closed);
        assert_eq!(resp.lines.len(), 1);
        assert_eq!(resp.lines[0].timestamp, "Error");
        assert!(resp.lines[0].message.starts_with("IPC error: "));
        assert_eq!(resp.fill_level, 0);
        assert_eq!(resp.max_size, 1);
    }

    #[test]
    fn response_json_uses_documented_keys() {
        let resp = LinesResponse {
            lines: vec![LogRecord::parse("t||h|f|s|p|1|m")],
            fill_level: 1,
            max_size: 5,
        };
        let json: serde_json::Value = serde_json::from_slice(&resp.encode().unwrap()).unwrap();
        assert_eq!(json["fill_level"], 1);
        assert_eq!(json["max_size"], 5);
        assert_eq!(json["lines"][0]["host"], "h");
    }

    #[test]
    fn codec_prefixes_big_endian_length() {
        let mut codec = codec();
        let mut dst = BytesMut::new();
        codec
            .encode(Bytes::from_static(b"abc"), &mut dst)
            .unwrap();
        assert_eq!(&dst[..4], &[0, 0, 0, 3]);
        let frame = codec.decode(&mut dst).unwrap().unwrap();
        assert_eq!(&frame[..], b"abc");
    }

    #[test]
    fn malformed_response_is_frame_error() {
        let err = LinesResponse::decode(b"{not json").unwrap_err();
        assert!(matches!(err, IpcError::Frame(_)));
    }
}
