//! PID file lifecycle.
//!
//! The file doubles as the address for reload requests: `logharbor rotate`
//! reads it and sends SIGHUP to the running daemon.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::Result;

use logharbor_core::pid;

/// Write the current process PID to `path`.
///
/// A file left behind by a dead process is replaced; a live owner is an error.
pub fn write_pid_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                fs::DirBuilder::new().mode(0o755).recursive(true).create(parent)?;
            }
            #[cfg(not(unix))]
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            match pid::read_pid_file(path)? {
                Some(existing) if pid::is_process_alive(existing) => {
                    return Err(anyhow::anyhow!(
                        "PID file {} already exists with PID: {}. Is another instance running?",
                        path.display(),
                        existing
                    ));
                }
                stale => {
                    tracing::warn!(path = %path.display(), stale_pid = ?stale, "replacing stale PID file");
                    fs::remove_file(path)?;
                    OpenOptions::new().write(true).create_new(true).open(path)?
                }
            }
        }
        Err(e) => return Err(e.into()),
    };

    if !file.metadata()?.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file",
            path.display()
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    let pid = std::process::id();
    writeln!(file, "{}", pid)?;
    tracing::info!(pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file on shutdown. Failure is logged, not returned.
pub fn remove_pid_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "PID file removed"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file"),
    }
}
