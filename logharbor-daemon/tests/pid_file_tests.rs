//! PID file lifecycle tests: create, duplicate detection, stale replacement.

use std::fs;

use logharbor_core::pid::read_pid_file;
use logharbor_daemon::pid_file::{remove_pid_file, write_pid_file};
use tempfile::TempDir;

#[test]
fn test_write_pid_file_records_current_process() {
    // Given: A temp directory with a nested PID path
    let temp_dir = TempDir::new().expect("should create temp dir");
    let pid_path = temp_dir.path().join("run").join("logharbor.pid");

    // When: Writing the PID file
    write_pid_file(&pid_path).expect("should write PID file");

    // Then: The parent is created and the file holds our PID
    assert_eq!(read_pid_file(&pid_path).unwrap(), Some(std::process::id()));
}

#[test]
fn test_write_pid_file_refuses_live_owner() {
    // Given: A PID file owned by a live process (this one)
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("logharbor.pid");
    fs::write(&pid_path, format!("{}\n", std::process::id())).unwrap();

    // When: Another instance tries to start
    let err = write_pid_file(&pid_path).unwrap_err();

    // Then: It is rejected and the file is untouched
    assert!(err.to_string().contains("already exists"));
    assert!(pid_path.exists());
}

#[test]
fn test_write_pid_file_replaces_stale_file() {
    // Given: A PID file left by a process that no longer exists
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("logharbor.pid");
    fs::write(&pid_path, "999999999\n").unwrap();

    // When: Writing the PID file
    write_pid_file(&pid_path).expect("stale file should be replaced");

    // Then: It now holds our PID
    assert_eq!(read_pid_file(&pid_path).unwrap(), Some(std::process::id()));
}

#[test]
fn test_write_pid_file_replaces_garbage() {
    // Given: A PID file with unparsable content
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("logharbor.pid");
    fs::write(&pid_path, "not-a-pid").unwrap();

    // When/Then: It is treated as stale
    write_pid_file(&pid_path).unwrap();
    assert_eq!(read_pid_file(&pid_path).unwrap(), Some(std::process::id()));
}

#[test]
fn test_remove_pid_file_tolerates_missing_file() {
    // Given: A written PID file
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("logharbor.pid");
    write_pid_file(&pid_path).unwrap();

    // When: Removing it twice
    remove_pid_file(&pid_path);
    remove_pid_file(&pid_path);

    // Then: It is gone and the second call did not panic
    assert!(!pid_path.exists());
}
