//! polyscript - polyglot script runner built around one native calling convention.
//!
//! A native module is any shared library exporting
//!
//! ```c
//! int run(int argc, const char **argv);
//! ```
//!
//! with C linkage. The caller owns `argv` for the duration of the call and a
//! return value of 0 means success. This crate provides:
//!
//! - an example module: the `cdylib` build of this crate exports [`ffi::run`],
//!   which echoes its arguments;
//! - a host that loads such modules and calls them ([`host`]);
//! - subprocess bridges for scripting languages ([`bridge`]);
//! - a resident daemon that serves runs over a Unix socket ([`daemon`]).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   FFI Layer (polyscript.h)          │
//! │   int run(int, const char**)        │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │              Host                   │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │  Native   │  │   Language    │  │
//! │  │  loader   │  │   bridges     │  │
//! │  └───────────┘  └───────────────┘  │
//! │  ┌─────────────────────────────┐   │
//! │  │   Daemon (tokio, UDS/JSON)  │   │
//! │  └─────────────────────────────┘   │
//! └─────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod daemon;
pub mod error;
pub mod ffi;
pub mod host;
pub mod logging;

// Re-export commonly used items
pub use bridge::{run_script, Language};
pub use config::HostConfig;
pub use error::{ArgError, BridgeError, ConfigError, DaemonError, HostError};
pub use host::{run_native, Entry, NativeModule};
pub use logging::init_logging;

// Re-export FFI types for cbindgen
pub use ffi::types::*;
pub use ffi::entry::run;
