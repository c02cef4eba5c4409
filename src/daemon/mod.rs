//! Resident runtime over a Unix domain socket.
//!
//! # Protocol
//!
//! Newline-delimited JSON, one request and one response per line:
//!
//! ```text
//! client -> server   {"lang":"py","script":"a.py","args":["x"]}
//! server -> client   {"exit":0,"stdout":"...","stderr":"..."}
//! stop request       {"lang":"","script":"","stop":true}
//! ```
//!
//! The server runs every request as a subprocess of its own executable
//! (`polyscript <lang> <script> [args...]`), so all bridges are reused as is.

pub mod protocol;
pub mod server;

pub use protocol::{Request, Response};
pub use server::Server;

use crate::config::HostConfig;
use crate::error::DaemonError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Build the multi-threaded runtime the daemon and its clients run on.
pub fn build_runtime(config: &HostConfig) -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.effective_workers())
        .enable_all()
        .build()
}

/// Client side of the daemon protocol.
#[derive(Debug, Clone)]
pub struct Client {
    socket_path: PathBuf,
}

impl Client {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    async fn connect(&self) -> Result<UnixStream, DaemonError> {
        UnixStream::connect(&self.socket_path).await.map_err(|err| {
            log::debug!(
                "event=daemon_connect_failed socket={} error=\"{}\"",
                self.socket_path.display(),
                err
            );
            DaemonError::NotRunning {
                socket: self.socket_path.clone(),
            }
        })
    }

    /// Send one request and wait for its response.
    pub async fn request(&self, req: &Request) -> Result<Response, DaemonError> {
        let stream = self.connect().await?;
        let (read_half, mut write_half) = stream.into_split();

        write_half
            .write_all(protocol::encode_line(req)?.as_bytes())
            .await?;
        write_half.shutdown().await?;

        let mut lines = BufReader::new(read_half).lines();
        match lines.next_line().await? {
            Some(line) => Ok(serde_json::from_str(&line)?),
            None => Err(DaemonError::NoResponse),
        }
    }

    /// Run a script through the daemon.
    pub async fn run_script(
        &self,
        lang: &str,
        script: &str,
        args: &[String],
    ) -> Result<Response, DaemonError> {
        self.request(&Request::run(lang, script, args.to_vec())).await
    }

    /// Ask the daemon to shut down.
    pub async fn stop(&self) -> Result<Response, DaemonError> {
        self.request(&Request::stop()).await
    }
}

/// Whether a started daemon is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    /// PID file present and the process exists.
    Running { pid: i32 },
    /// PID file present but the process is gone.
    Stale { pid: i32 },
    /// No PID file.
    Stopped,
}

impl std::fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonStatus::Running { pid } => write!(f, "running (PID {})", pid),
            DaemonStatus::Stale { pid } => write!(f, "not running (stale PID {})", pid),
            DaemonStatus::Stopped => write!(f, "not running"),
        }
    }
}

/// Re-launch the current executable as `daemon serve` in the background and
/// record its PID.
pub fn start(config: &HostConfig) -> Result<u32, DaemonError> {
    let exe = std::env::current_exe()?;
    let child = Command::new(exe)
        .args(["daemon", "serve"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let pid = child.id();
    std::fs::write(&config.pid_file, pid.to_string())?;
    log::info!(
        "event=daemon_started pid={} pid_file={}",
        pid,
        config.pid_file.display()
    );
    Ok(pid)
}

/// Read the PID file and check whether the process is alive.
pub fn status(pid_file: &Path) -> Result<DaemonStatus, DaemonError> {
    let contents = match std::fs::read_to_string(pid_file) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DaemonStatus::Stopped)
        }
        Err(err) => return Err(err.into()),
    };

    let pid: i32 = match contents.trim().parse() {
        Ok(pid) if pid > 0 => pid,
        _ => {
            log::warn!(
                "event=pid_file_invalid path={} contents={:?}",
                pid_file.display(),
                contents
            );
            return Ok(DaemonStatus::Stopped);
        }
    };

    if process_alive(pid) {
        Ok(DaemonStatus::Running { pid })
    } else {
        Ok(DaemonStatus::Stale { pid })
    }
}

/// Remove the PID file, ignoring a missing one.
pub fn clear_pid_file(pid_file: &Path) -> Result<(), DaemonError> {
    match std::fs::remove_file(pid_file) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn process_alive(pid: i32) -> bool {
    // SAFETY: signal 0 performs only the existence and permission check.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM: the process exists but belongs to someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
