//! Wire format: one JSON object per line in each direction.

use crate::error::{BridgeError, DaemonError};
use serde::{Deserialize, Serialize};

/// Client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub lang: String,
    pub script: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub stop: bool,
}

impl Request {
    pub fn run(lang: impl Into<String>, script: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            lang: lang.into(),
            script: script.into(),
            args,
            stop: false,
        }
    }

    pub fn stop() -> Self {
        Self {
            lang: String::new(),
            script: String::new(),
            args: Vec::new(),
            stop: true,
        }
    }
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Exit code of the script; -1 when it was killed or the request was malformed.
    pub exit: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Response {
    pub fn stopped() -> Self {
        Self {
            exit: 0,
            stdout: String::new(),
            stderr: "daemon stopped".to_string(),
        }
    }

    pub fn malformed(err: &serde_json::Error) -> Self {
        Self {
            exit: -1,
            stdout: String::new(),
            stderr: format!("malformed request: {}", err),
        }
    }

    /// Reply to a request the daemon refuses to run.
    pub fn rejected(err: &BridgeError) -> Self {
        Self {
            exit: -1,
            stdout: String::new(),
            stderr: err.to_string(),
        }
    }

    /// Fail unless the script exited with 0.
    pub fn check(&self) -> Result<(), DaemonError> {
        if self.exit == 0 {
            Ok(())
        } else {
            Err(DaemonError::ScriptFailed { exit: self.exit })
        }
    }
}

/// Encode a message as a single line, newline included.
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, DaemonError> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}
