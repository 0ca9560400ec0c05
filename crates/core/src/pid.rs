//! PID 파일 읽기와 프로세스 신호
//!
//! 데몬은 PID 파일을 쓰고, CLI는 이 모듈로 데몬의 생존 여부를 확인하거나
//! 설정 재로드(SIGHUP)를 요청합니다.

use std::path::Path;

use tracing::{debug, warn};

/// PID 파일에서 PID를 읽습니다. 파일이 없으면 `Ok(None)`입니다.
pub fn read_pid_file(path: &Path) -> std::io::Result<Option<u32>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "pid file does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    match content.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(Some(pid)),
        _ => {
            warn!(path = %path.display(), content = content.trim(), "failed to parse pid");
            Ok(None)
        }
    }
}

/// 프로세스가 살아 있는지 확인합니다.
#[cfg(unix)]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: 신호 0은 대상 프로세스에 아무 영향도 주지 않고 존재 여부만 확인
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().kind() == std::io::ErrorKind::PermissionDenied
}

#[cfg(not(unix))]
pub fn is_process_alive(_pid: u32) -> bool {
    warn!("process liveness check not supported on this platform");
    false
}

/// 프로세스에 설정 재로드(SIGHUP)를 요청합니다.
#[cfg(unix)]
pub fn send_reload(pid: u32) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill(2)은 메모리를 건드리지 않으며 실패는 errno로 보고됨
    let result = unsafe { libc::kill(pid, libc::SIGHUP) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub fn send_reload(_pid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "reload signal not supported on this platform",
    ))
}
