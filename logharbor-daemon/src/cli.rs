//! CLI argument definitions for logharbor-daemon.

use std::path::PathBuf;

use clap::Parser;

/// Logharbor syslog aggregation daemon.
///
/// Tails the live log into an in-memory window, serves it over a local
/// socket, and rotates/compresses the log file on age or size triggers.
#[derive(Parser, Debug)]
#[command(name = "logharbor-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logharbor.toml configuration file.
    #[arg(short, long, default_value = "/etc/logharbor/logharbor.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Override PID file path (takes precedence over config file).
    #[arg(long)]
    pub pid_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = DaemonCli::try_parse_from(["logharbor-daemon"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/logharbor/logharbor.toml"));
        assert!(!cli.validate);
        assert!(cli.pid_file.is_none());
    }

    #[test]
    fn overrides() {
        let cli = DaemonCli::try_parse_from([
            "logharbor-daemon",
            "-c",
            "/tmp/l.toml",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--pid-file",
            "/tmp/l.pid",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/l.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("pretty"));
        assert_eq!(cli.pid_file, Some(PathBuf::from("/tmp/l.pid")));
        assert!(cli.validate);
    }
}
