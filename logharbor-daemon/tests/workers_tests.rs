//! Worker lifecycle tests: start, live query, reload and shutdown.
//!
//! Real files and sockets under a temp dir; timing-dependent steps poll
//! until the condition holds.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use logharbor_core::config::LogharborConfig;
use logharbor_daemon::workers::Workers;
use logharbor_log_pipeline::LiveClient;

const WAIT_LIMIT: Duration = Duration::from_secs(10);

fn append_lines(path: &Path, host: &str, count: usize) {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    for i in 0..count {
        writeln!(
            file,
            "2024-01-01T00:00:{:02}+00:00||{host}|daemon|info|cron|{i}|job {i}",
            i % 60
        )
        .unwrap();
    }
    file.sync_all().unwrap();
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

fn test_config(dir: &Path) -> LogharborConfig {
    let mut config = LogharborConfig::default();
    config.paths.log_file = dir.join("messages");
    config.paths.socket_path = dir.join("logbuffer.sock");
    config.general.pid_file = dir.join("logharbor.pid");
    config.buffer.max_size = 100;
    config.buffer.trim_size = 10;
    config.tailer.poll_interval_ms = 50;
    config.rotation.enabled = false;
    config
}

#[tokio::test]
async fn test_workers_serve_tailed_lines() {
    // Given: A log file with five records
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    append_lines(&config.paths.log_file, "alpha", 5);

    // When: Workers start
    let workers = Workers::start(config.clone());
    assert!(wait_until(|| workers.buffer().len() == 5).await);
    assert!(wait_until(|| config.paths.socket_path.exists()).await);

    // Then: The live client sees the same window
    let client = LiveClient::new(&config.paths.socket_path, Duration::from_secs(2));
    let resp = client.fetch().await.expect("live query should succeed");
    assert_eq!(resp.lines.len(), 5);
    assert_eq!(resp.fill_level, 5);
    assert_eq!(resp.max_size, 100);
    assert_eq!(resp.lines[0].host, "alpha");

    // And: Shutdown removes the socket
    workers.shutdown().await;
    assert!(!config.paths.socket_path.exists());
}

#[tokio::test]
async fn test_reload_resizes_buffer_in_place() {
    // Given: Running workers with 20 buffered lines
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    append_lines(&config.paths.log_file, "alpha", 20);
    let mut workers = Workers::start(config.clone());
    assert!(wait_until(|| workers.buffer().len() == 20).await);

    // When: Reloading with a smaller capacity
    let mut smaller = config.clone();
    smaller.buffer.max_size = 8;
    smaller.buffer.trim_size = 2;
    workers.reload(smaller).await;

    // Then: The buffer keeps its newest lines within the new capacity
    assert_eq!(workers.buffer().max_size(), 8);
    assert!(workers.buffer().len() <= 8);
    assert_eq!(workers.config().buffer.max_size, 8);

    // And: Tailing continues
    append_lines(&config.paths.log_file, "beta", 1);
    assert!(
        wait_until(|| {
            workers
                .buffer()
                .snapshot()
                .records
                .last()
                .is_some_and(|r| r.host == "beta")
        })
        .await
    );

    workers.shutdown().await;
}

#[tokio::test]
async fn test_reload_switches_log_file() {
    // Given: Workers tailing one file
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    append_lines(&config.paths.log_file, "alpha", 3);
    let mut workers = Workers::start(config.clone());
    assert!(wait_until(|| workers.buffer().len() == 3).await);

    // When: Reloading with another log file
    let other = dir.path().join("other.log");
    append_lines(&other, "gamma", 2);
    let mut moved = config.clone();
    moved.paths.log_file = other.clone();
    workers.reload(moved).await;

    // Then: The new file's lines land in the same buffer
    assert!(wait_until(|| workers.buffer().len() == 5).await);
    let hosts: Vec<String> = workers
        .buffer()
        .snapshot()
        .records
        .into_iter()
        .map(|r| r.host)
        .collect();
    assert_eq!(hosts, vec!["alpha", "alpha", "alpha", "gamma", "gamma"]);

    workers.shutdown().await;
}

#[tokio::test]
async fn test_rotation_worker_archives_old_log() {
    // Given: A log whose records are far older than max_age_days
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.rotation.enabled = true;
    config.rotation.max_age_days = 1;
    config.rotation.reopen_command = Vec::new();
    append_lines(&config.paths.log_file, "alpha", 5);

    // When: Workers start (the rotation check runs immediately)
    let workers = Workers::start(config.clone());

    // Then: A compressed archive appears and the live file is gone
    let archived = wait_until(|| {
        std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.starts_with("messages.") && name.ends_with(".gz")
            })
    })
    .await;
    assert!(archived, "expected a gzipped archive in {}", dir.path().display());
    assert!(!config.paths.log_file.exists());

    workers.shutdown().await;
}
