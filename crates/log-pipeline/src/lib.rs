#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`buffer`]: 용량 제한 라이브 윈도우 버퍼
//! - [`tailer`]: 로테이션 안전 파일 테일러 (상태 기계)
//! - [`protocol`]: 라이브 조회 요청/응답 프레임
//! - [`server`]: 유닉스 소켓 조회 서버
//! - [`client`]: 조회 클라이언트 (실패 시 대체 응답)
//! - [`live`]: 필터/개수 제한이 적용된 라이브 뷰
//! - [`error`]: 도메인 에러 타입

pub mod buffer;
pub mod client;
pub mod error;
pub mod live;
pub mod protocol;
pub mod server;
pub mod tailer;

// --- 주요 타입 re-export ---

pub use buffer::{AppendOutcome, LogBuffer, Snapshot};
pub use client::LiveClient;
pub use error::LogPipelineError;
pub use live::{LiveQuery, LiveView};
pub use protocol::{LinesResponse, Request};
pub use server::QueryServer;
pub use tailer::{Tailer, TailerConfig, TailerHandle, TailerState};
