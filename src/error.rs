//! Error types for each layer of the crate.

use crate::ffi::types::PolyStatus;
use std::ffi::c_int;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors raised while reading or building an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// `argc` was negative.
    NegativeCount(c_int),
    /// `argc` was positive but `argv` was null.
    NullArray { argc: c_int },
    /// `argv[index]` was null.
    NullElement { index: usize },
    /// A host-side argument contained an interior NUL byte.
    InteriorNul { index: usize },
    /// More host-side arguments than a C `int` can count.
    TooMany { count: usize },
}

impl ArgError {
    /// Status code reported across the ABI for this error.
    pub fn status(&self) -> PolyStatus {
        match self {
            ArgError::NegativeCount(_)
            | ArgError::InteriorNul { .. }
            | ArgError::TooMany { .. } => PolyStatus::InvalidArgument,
            ArgError::NullArray { .. } | ArgError::NullElement { .. } => PolyStatus::NullPointer,
        }
    }
}

impl std::fmt::Display for ArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgError::NegativeCount(argc) => write!(f, "Negative argument count: {}", argc),
            ArgError::NullArray { argc } => {
                write!(f, "Null argument array with argument count {}", argc)
            }
            ArgError::NullElement { index } => write!(f, "Null pointer at argv[{}]", index),
            ArgError::InteriorNul { index } => {
                write!(f, "Argument {} contains an interior NUL byte", index)
            }
            ArgError::TooMany { count } => {
                write!(f, "Too many arguments for a C argument count: {}", count)
            }
        }
    }
}

impl std::error::Error for ArgError {}

/// Errors raised by the native module host.
#[derive(Debug)]
pub enum HostError {
    /// The shared library could not be loaded.
    Load {
        path: PathBuf,
        source: libloading::Error,
    },
    /// The entry point symbol was not found in the library.
    Symbol {
        symbol: String,
        source: libloading::Error,
    },
    /// Arguments could not be marshalled.
    Args(ArgError),
    /// The entry point returned a non-zero code.
    NonZero {
        code: c_int,
        status: Option<PolyStatus>,
    },
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Load { path, .. } => {
                write!(f, "Failed to load native module {}", path.display())
            }
            HostError::Symbol { symbol, .. } => write!(f, "Symbol `{}` not found", symbol),
            HostError::Args(err) => write!(f, "Invalid arguments: {}", err),
            HostError::NonZero {
                code,
                status: Some(status),
            } => write!(f, "Native function returned {} ({})", code, status.name()),
            HostError::NonZero { code, status: None } => {
                write!(f, "Native function returned {}", code)
            }
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Load { source, .. } | HostError::Symbol { source, .. } => Some(source),
            HostError::Args(err) => Some(err),
            HostError::NonZero { .. } => None,
        }
    }
}

impl From<ArgError> for HostError {
    fn from(err: ArgError) -> Self {
        HostError::Args(err)
    }
}

/// Errors raised by the language bridges.
#[derive(Debug)]
pub enum BridgeError {
    /// The program could not be started at all.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The compile step of a compile-then-run bridge failed.
    Compile { compiler: String, status: ExitStatus },
    /// The script (or compiled binary) exited unsuccessfully.
    Exit { program: String, status: ExitStatus },
    /// The short name did not match any known language.
    UnknownLanguage(String),
    /// The script file could not be read (in-process bridges).
    Read {
        path: String,
        source: std::io::Error,
    },
    /// The embedded interpreter raised an exception.
    Python(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Spawn { program, .. } => write!(f, "Failed to start `{}`", program),
            BridgeError::Compile { compiler, status } => {
                write!(f, "{}: compilation failed ({})", compiler, status)
            }
            BridgeError::Exit { program, status } => write!(f, "{} exited with {}", program, status),
            BridgeError::UnknownLanguage(name) => write!(f, "Unknown language `{}`", name),
            BridgeError::Read { path, .. } => write!(f, "Failed to read script `{}`", path),
            BridgeError::Python(message) => write!(f, "Python error: {}", message),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Spawn { source, .. } | BridgeError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised by the daemon server and its clients.
#[derive(Debug)]
pub enum DaemonError {
    /// No daemon is listening on the socket.
    NotRunning { socket: PathBuf },
    /// Socket or process I/O failed.
    Io(std::io::Error),
    /// A protocol line could not be encoded or decoded.
    Protocol(serde_json::Error),
    /// The daemon closed the connection without answering.
    NoResponse,
    /// The script run through the daemon exited non-zero.
    ScriptFailed { exit: i32 },
}

impl std::fmt::Display for DaemonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonError::NotRunning { socket } => write!(
                f,
                "daemon not running on {} (start with `polyscript daemon start`)",
                socket.display()
            ),
            DaemonError::Io(err) => write!(f, "daemon I/O error: {}", err),
            DaemonError::Protocol(err) => write!(f, "malformed daemon message: {}", err),
            DaemonError::NoResponse => write!(f, "daemon closed the connection without a response"),
            DaemonError::ScriptFailed { exit } => write!(f, "script exited with {}", exit),
        }
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DaemonError::Io(err) => Some(err),
            DaemonError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DaemonError {
    fn from(err: std::io::Error) -> Self {
        DaemonError::Io(err)
    }
}

impl From<serde_json::Error> for DaemonError {
    fn from(err: serde_json::Error) -> Self {
        DaemonError::Protocol(err)
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `POLYSCRIPT_WORKERS` was not a non-negative integer.
    InvalidWorkers(String),
    /// The log level string was not recognised.
    InvalidLogLevel(String),
    /// The logger backend could not be started or reconfigured.
    Logging(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidWorkers(value) => {
                write!(f, "Invalid worker count `{}`: expected a non-negative integer", value)
            }
            ConfigError::InvalidLogLevel(value) => write!(
                f,
                "Unsupported log level `{}`: expected trace|debug|info|warn|error",
                value
            ),
            ConfigError::Logging(msg) => write!(f, "Logging setup failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_error_status() {
        assert_eq!(ArgError::NegativeCount(-1).status(), PolyStatus::InvalidArgument);
        assert_eq!(ArgError::NullArray { argc: 2 }.status(), PolyStatus::NullPointer);
        assert_eq!(ArgError::NullElement { index: 0 }.status(), PolyStatus::NullPointer);
        assert_eq!(ArgError::TooMany { count: 0 }.status(), PolyStatus::InvalidArgument);
    }

    #[test]
    fn test_host_error_display_names_known_status() {
        let err = HostError::NonZero {
            code: 1,
            status: PolyStatus::from_code(1),
        };
        assert_eq!(err.to_string(), "Native function returned 1 (null_pointer)");

        let err = HostError::NonZero {
            code: 77,
            status: None,
        };
        assert_eq!(err.to_string(), "Native function returned 77");
    }

    #[test]
    fn test_bridge_read_error_keeps_source() {
        use std::error::Error;

        let err = BridgeError::Read {
            path: "a.py".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Failed to read script `a.py`");
        assert!(err.source().is_some());
        assert!(BridgeError::Python("boom".to_string()).source().is_none());
    }
}
