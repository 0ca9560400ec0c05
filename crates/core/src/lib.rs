#![doc = include_str!("../README.md")]

pub mod archive_name;
pub mod config;
pub mod control;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod pid;
pub mod record;
pub mod timestamp;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, IpcError, LogharborError, RecordError};

// 설정
pub use config::LogharborConfig;

// 제어 trait
pub use control::RestartSignal;

// 레코드 / 필터
pub use filter::{FilterOptions, LineLimit, RecordFilter};
pub use record::LogRecord;
