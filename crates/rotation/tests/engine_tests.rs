//! 로테이션 엔진 통합 테스트 -- 실제 디렉토리에서 전체 절차 검증

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use flate2::read::GzDecoder;
use tokio_util::sync::CancellationToken;

use logharbor_core::control::RestartSignal;
use logharbor_core::error::LogharborError;
use logharbor_rotation::{
    RetentionPolicy, RotationEngine, RotationPolicy, RotationSettings, RotationTrigger,
    UpstreamReopen,
};

/// 재시작 요청 횟수를 세는 신호
#[derive(Default)]
struct CountingSignal {
    calls: AtomicUsize,
}

impl RestartSignal for CountingSignal {
    fn request_restart(&self) -> Result<(), LogharborError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct ClosedSignal;

impl RestartSignal for ClosedSignal {
    fn request_restart(&self) -> Result<(), LogharborError> {
        Err(LogharborError::Channel("tailer is not running".to_owned()))
    }
}

const LINES: &str = "2024-01-01T00:00:00+00:00||h|auth|info|sshd|1|first\n\
                     2024-01-01T00:30:00+00:00||h|auth|info|sshd|1|middle\n\
                     2024-01-01T01:00:00+00:00||h|auth|info|sshd|1|last\n";

const ARCHIVE: &str = "messages.2024-01-01_00-00-00-to-2024-01-01_01-00-00.gz";

fn settings(dir: &Path, reopen: Vec<String>) -> RotationSettings {
    RotationSettings {
        log_file: dir.join("messages"),
        check_interval: Duration::from_millis(50),
        policy: RotationPolicy {
            max_age_days: 30,
            max_size_bytes: 100 * 1024 * 1024,
        },
        reopen: UpstreamReopen::new(reopen, Duration::from_secs(5)),
        retention: Some(RetentionPolicy {
            min_count: 20,
            total_max_bytes: u64::MAX,
            max_age: Duration::from_secs(3650 * 86_400),
        }),
    }
}

fn gunzip(path: &Path) -> String {
    let mut text = String::new();
    GzDecoder::new(std::fs::File::open(path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    text
}

#[tokio::test]
async fn test_forced_rotation_full_procedure() {
    // Given: 한 시간 분량의 라이브 로그와 새 파일을 만드는 재오픈 명령
    let dir = tempfile::tempdir().unwrap();
    let live = dir.path().join("messages");
    std::fs::write(&live, LINES).unwrap();
    let reopen = vec![
        "sh".to_owned(),
        "-c".to_owned(),
        format!("touch '{}'", live.display()),
    ];
    let signal = Arc::new(CountingSignal::default());
    let engine = RotationEngine::new(settings(dir.path(), reopen), signal.clone());

    // When
    let outcome = engine.force_rotate().await.unwrap();

    // Then: 압축 아카이브가 생기고 원래 경로에는 새 빈 파일, 테일러에 한 번 신호
    assert_eq!(outcome.trigger, RotationTrigger::Forced);
    assert_eq!(outcome.archive, dir.path().join(ARCHIVE));
    assert!(outcome.compressed);
    assert!(outcome.reopened);
    assert!(outcome.restart_signaled);
    assert_eq!(gunzip(&outcome.archive), LINES);
    assert!(!dir.path().join(ARCHIVE.trim_end_matches(".gz")).exists());
    assert_eq!(std::fs::read_to_string(&live).unwrap(), "");
    assert_eq!(signal.calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.retention.unwrap().remaining_count, 1);
}

#[tokio::test]
async fn test_failed_reopen_does_not_abort_rotation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("messages"), LINES).unwrap();
    let signal = Arc::new(CountingSignal::default());
    let engine = RotationEngine::new(
        settings(dir.path(), vec!["false".to_owned()]),
        signal.clone(),
    );

    let outcome = engine.force_rotate().await.unwrap();

    assert!(!outcome.reopened);
    assert!(outcome.compressed);
    assert_eq!(signal.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_closed_signal_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("messages"), LINES).unwrap();
    let engine = RotationEngine::new(settings(dir.path(), Vec::new()), Arc::new(ClosedSignal));

    let outcome = engine.force_rotate().await.unwrap();
    assert!(!outcome.restart_signaled);
    assert!(dir.path().join(ARCHIVE).exists());
}

#[tokio::test]
async fn test_rotation_skipped_without_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let live = dir.path().join("messages");
    std::fs::write(&live, "garbage without delimiter\n").unwrap();
    let signal = Arc::new(CountingSignal::default());
    let engine = RotationEngine::new(settings(dir.path(), Vec::new()), signal.clone());

    assert!(engine.force_rotate().await.is_err());
    assert!(live.exists());
    assert_eq!(signal.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_check_once_skips_oversized_file_without_timestamps() {
    // Given: 크기 기준은 넘었지만 구분자가 있는 라인이 없는 파일
    let dir = tempfile::tempdir().unwrap();
    let live = dir.path().join("messages");
    std::fs::write(&live, "no delimiter in this line at all\n").unwrap();
    let mut settings = settings(dir.path(), Vec::new());
    settings.policy.max_size_bytes = 1;
    let signal = Arc::new(CountingSignal::default());
    let engine = RotationEngine::new(settings, signal.clone());

    // When
    let outcome = engine.check_once().await;

    // Then: 에러 없이 이번 주기를 건너뜀
    assert_eq!(outcome.unwrap(), None);
    assert!(live.exists());
    assert_eq!(signal.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_check_once_skips_fresh_small_file() {
    let dir = tempfile::tempdir().unwrap();
    let now = chrono::Utc::now().to_rfc3339();
    std::fs::write(dir.path().join("messages"), format!("{now}||h|f|s|p|1|fresh\n")).unwrap();
    let engine = RotationEngine::new(
        settings(dir.path(), Vec::new()),
        Arc::new(CountingSignal::default()),
    );

    assert_eq!(engine.check_once().await.unwrap(), None);
}

#[tokio::test]
async fn test_check_once_skips_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RotationEngine::new(
        settings(dir.path(), Vec::new()),
        Arc::new(CountingSignal::default()),
    );
    assert_eq!(engine.check_once().await.unwrap(), None);
}

#[tokio::test]
async fn test_run_loop_rotates_old_log_and_stops_on_cancel() {
    // Given: 기준보다 오래된 라이브 로그
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("messages"), LINES).unwrap();
    let signal = Arc::new(CountingSignal::default());
    let engine = RotationEngine::new(settings(dir.path(), Vec::new()), signal.clone());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(engine.run(cancel.clone()));

    // When: 첫 주기가 지나면
    let archive = dir.path().join(ARCHIVE);
    for _ in 0..200 {
        if archive.exists() && signal.calls.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Then: 로테이션되었고, 취소하면 루프가 끝남
    assert!(archive.exists());
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
