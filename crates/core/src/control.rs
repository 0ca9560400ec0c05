//! 컴포넌트 간 제어 trait — 워커 경계의 확장 포인트
//!
//! 로테이션 엔진은 테일러 구현에 직접 의존하지 않고 이 trait을 통해
//! 재시작을 요청합니다. 데몬이 실제 테일러 핸들을 주입합니다.

use crate::error::LogharborError;

/// 감시 재시작 요청을 받는 쪽
///
/// 요청은 멱등입니다. 이미 대기 중인 요청이 있으면 새 요청은 합쳐질 수 있습니다.
pub trait RestartSignal: Send + Sync {
    /// 재시작을 요청합니다. 수신 측이 종료되었으면 에러를 반환합니다.
    fn request_restart(&self) -> Result<(), LogharborError>;
}

/// 아무 일도 하지 않는 신호 (테일러 없이 로테이션만 수행할 때)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignal;

impl RestartSignal for NoopSignal {
    fn request_restart(&self) -> Result<(), LogharborError> {
        Ok(())
    }
}
