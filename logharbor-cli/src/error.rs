//! CLI-specific error types and exit code mapping

use logharbor_core::error::LogharborError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Cannot reach the daemon (socket or PID file).
    #[error("daemon not reachable: {0}")]
    DaemonUnavailable(String),

    /// Archive search rejected the query or could not list files.
    #[error("search error: {0}")]
    Search(String),

    /// Rotation could not complete.
    #[error("rotation error: {0}")]
    Rotation(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logharbor-core.
    #[error("{0}")]
    Core(#[from] LogharborError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                |
    /// |------|------------------------|
    /// | 0    | Success                |
    /// | 1    | General / command error |
    /// | 2    | Configuration error    |
    /// | 3    | Daemon unreachable     |
    /// | 4    | Invalid search         |
    /// | 5    | Rotation failed        |
    /// | 10   | IO error               |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LogharborError::Config(_)) => 2,
            Self::DaemonUnavailable(_) | Self::Core(LogharborError::Ipc(_)) => 3,
            Self::Search(_) => 4,
            Self::Rotation(_) => 5,
            Self::Io(_) | Self::Core(LogharborError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<logharbor_archive::ArchiveError> for CliError {
    fn from(e: logharbor_archive::ArchiveError) -> Self {
        Self::Search(e.to_string())
    }
}

impl From<logharbor_rotation::RotationError> for CliError {
    fn from(e: logharbor_rotation::RotationError) -> Self {
        Self::Rotation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use logharbor_core::error::{ConfigError, IpcError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = LogharborError::Config(ConfigError::FileNotFound {
            path: "logharbor.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2, "core config errors keep exit code 2");
    }

    #[test]
    fn test_exit_code_daemon_unavailable() {
        assert_eq!(CliError::DaemonUnavailable("x".to_owned()).exit_code(), 3);
        let ipc: CliError = LogharborError::Ipc(IpcError::Closed).into();
        assert_eq!(ipc.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_search_error() {
        let err: CliError = logharbor_archive::ArchiveError::InvalidTime {
            value: "yesterday".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_exit_code_rotation_error() {
        let err: CliError = logharbor_rotation::RotationError::Task("panicked".to_owned()).into();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(err.to_string(), "execution failed");
    }
}
