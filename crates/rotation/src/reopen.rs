//! 상위 로그 작성자 재오픈
//!
//! 이름 변경 후 syslog 데몬이 원래 경로에 새 파일을 열도록 외부 명령을 실행합니다.
//! 명령이 멈추더라도 로테이션 루프가 묶이지 않도록 대기 시간을 제한합니다.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use logharbor_core::config::RotationConfig;

use crate::error::RotationError;

/// 재오픈 명령 실행기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReopen {
    command: Vec<String>,
    timeout: Duration,
}

impl UpstreamReopen {
    /// 명령과 인자 목록으로 생성합니다. 빈 목록이면 재오픈을 건너뜁니다.
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(
            config.reopen_command.clone(),
            Duration::from_secs(config.reopen_timeout_secs),
        )
    }

    /// 실행할 명령이 설정되어 있는지
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }

    fn display(&self) -> String {
        self.command.join(" ")
    }

    /// 명령을 실행하고 종료를 기다립니다.
    ///
    /// 제한 시간을 넘기면 프로세스를 종료하고 에러를 반환합니다.
    pub async fn run(&self) -> Result<(), RotationError> {
        let Some((program, args)) = self.command.split_first() else {
            debug!("no reopen command configured, skipping");
            return Ok(());
        };
        info!(command = %self.display(), "running reopen command");

        let fail = |reason: String| RotationError::Reopen {
            command: self.display(),
            reason,
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| fail(e.to_string()))?;

        // stderr는 종료 대기와 동시에 읽음. 시간 초과 시 future가 버려지며 kill_on_drop으로 종료
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| fail(e.to_string()))?,
            Err(_) => {
                return Err(fail(format!("timed out after {}s", self.timeout.as_secs())));
            }
        };

        if output.status.success() {
            return Ok(());
        }
        let detail = String::from_utf8_lossy(&output.stderr);
        Err(fail(format!("{} {}", output.status, detail.trim()).trim().to_owned()))
    }
}
