//! Host configuration.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Default socket path of the resident daemon.
pub const DEFAULT_SOCKET: &str = "/tmp/polyscript_daemon.sock";
/// Default PID file of the resident daemon.
pub const DEFAULT_PID_FILE: &str = "/tmp/polyscript_daemon.pid";
/// Default log level when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration shared by the CLI, the bridges and the daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Unix socket the daemon listens on.
    pub socket_path: PathBuf,
    /// File holding the PID of a started daemon.
    pub pid_file: PathBuf,
    /// Directory for compiled bridge artifacts.
    pub tmp_dir: PathBuf,
    /// Daemon worker threads (0 = auto-detect).
    pub worker_threads: usize,
    /// Log level (`trace|debug|info|warn|error`).
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET),
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
            tmp_dir: std::env::temp_dir(),
            worker_threads: 0,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl HostConfig {
    /// Defaults overridden by `POLYSCRIPT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HostConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(sock) = lookup("POLYSCRIPT_SOCK") {
            config.socket_path = PathBuf::from(sock);
        }
        if let Some(pid) = lookup("POLYSCRIPT_PID_FILE") {
            config.pid_file = PathBuf::from(pid);
        }
        if let Some(tmp) = lookup("POLYSCRIPT_TMP") {
            config.tmp_dir = PathBuf::from(tmp);
        }
        if let Some(workers) = lookup("POLYSCRIPT_WORKERS") {
            config.worker_threads = workers
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidWorkers(workers.clone()))?;
        }
        if let Some(level) = lookup("POLYSCRIPT_LOG") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Worker thread count with 0 resolved to the number of CPUs.
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HostConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_env_overrides() {
        let config = HostConfig::from_lookup(lookup_from(&[
            ("POLYSCRIPT_SOCK", "/run/ps.sock"),
            ("POLYSCRIPT_PID_FILE", "/run/ps.pid"),
            ("POLYSCRIPT_TMP", "/var/tmp"),
            ("POLYSCRIPT_WORKERS", " 3 "),
            ("POLYSCRIPT_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.socket_path, PathBuf::from("/run/ps.sock"));
        assert_eq!(config.pid_file, PathBuf::from("/run/ps.pid"));
        assert_eq!(config.tmp_dir, PathBuf::from("/var/tmp"));
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.effective_workers(), 3);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_workers() {
        let result = HostConfig::from_lookup(lookup_from(&[("POLYSCRIPT_WORKERS", "many")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidWorkers("many".to_string())
        );
    }

    #[test]
    fn test_auto_workers() {
        let config = HostConfig::default();
        assert!(config.effective_workers() >= 1);
    }
}
