//! Daemon server loop.

use super::protocol::{encode_line, Request, Response};
use crate::bridge::Language;
use crate::error::DaemonError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::process::Command;
use tokio::sync::Notify;

/// A bound daemon, ready to serve.
pub struct Server {
    listener: UnixListener,
    socket_path: PathBuf,
    program: PathBuf,
    shutdown: Arc<Notify>,
}

impl Server {
    /// Bind the socket, replacing a stale socket file if one exists.
    ///
    /// Each request is executed as `program <lang> <script> [args...]`.
    /// Must be called from within a tokio runtime.
    pub fn bind(socket_path: impl AsRef<Path>, program: impl Into<PathBuf>) -> Result<Self, DaemonError> {
        let socket_path = socket_path.as_ref().to_path_buf();
        match std::fs::remove_file(&socket_path) {
            Ok(()) => log::debug!("event=stale_socket_removed path={}", socket_path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let listener = UnixListener::bind(&socket_path)?;
        log::info!("event=daemon_listening socket={}", socket_path.display());

        Ok(Self {
            listener,
            socket_path,
            program: program.into(),
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections until a stop request arrives.
    ///
    /// Every connection is handled on its own task. On stop the socket file
    /// is removed; in-flight connections on other tasks are left to finish.
    pub async fn serve(self) -> Result<(), DaemonError> {
        let program = Arc::new(self.program);

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                accepted = self.listener.accept() => {
                    let (stream, _) = accepted?;
                    let program = program.clone();
                    let shutdown = self.shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(err) = handle_conn(stream, &program, &shutdown).await {
                            log::warn!("event=connection_error error=\"{}\"", err);
                        }
                    });
                }
            }
        }

        if let Err(err) = std::fs::remove_file(&self.socket_path) {
            log::warn!(
                "event=socket_remove_failed path={} error=\"{}\"",
                self.socket_path.display(),
                err
            );
        }
        log::info!("event=daemon_stopped");
        Ok(())
    }
}

async fn handle_conn(
    stream: UnixStream,
    program: &Path,
    shutdown: &Notify,
) -> Result<(), DaemonError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(err) => {
                log::warn!("event=malformed_request error=\"{}\"", err);
                let reply = encode_line(&Response::malformed(&err))?;
                write_half.write_all(reply.as_bytes()).await?;
                continue;
            }
        };

        if req.stop {
            write_half
                .write_all(encode_line(&Response::stopped())?.as_bytes())
                .await?;
            write_half.flush().await?;
            shutdown.notify_one();
            return Ok(());
        }

        // Only bridge names are forwarded as the child's subcommand.
        if let Err(err) = req.lang.parse::<Language>() {
            log::warn!("event=request_rejected lang={:?} error=\"{}\"", req.lang, err);
            let reply = encode_line(&Response::rejected(&err))?;
            write_half.write_all(reply.as_bytes()).await?;
            continue;
        }

        let resp = execute(program, &req).await;
        write_half.write_all(encode_line(&resp)?.as_bytes()).await?;
    }

    Ok(())
}

async fn execute(program: &Path, req: &Request) -> Response {
    log::info!(
        "event=daemon_request lang={} script={} argc={}",
        req.lang,
        req.script,
        req.args.len()
    );

    let output = Command::new(program)
        .arg(&req.lang)
        .arg(&req.script)
        .args(&req.args)
        .output()
        .await;

    let out = match output {
        Ok(out) => out,
        Err(err) => {
            log::error!(
                "event=daemon_spawn_failed program={} error=\"{}\"",
                program.display(),
                err
            );
            return Response {
                exit: -1,
                stdout: String::new(),
                stderr: format!("failed to start {}: {}", program.display(), err),
            };
        }
    };

    let exit = out.status.code().unwrap_or(-1);
    log::debug!("event=daemon_response exit={}", exit);

    Response {
        exit,
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    }
}
