//! Logger bootstrap.
//!
//! Logs go to stderr so that stdout stays reserved for script output. Lines
//! use `event=<name> key=value` pairs.

use crate::error::ConfigError;
use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Initialize logging once per process.
///
/// Repeated calls with the same level are no-ops. A call with a different
/// level after initialization is rejected.
pub fn init_logging(level: &str) -> Result<(), ConfigError> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, ConfigError> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| ConfigError::Logging(err.to_string()))?
            .log_to_stderr()
            .format(flexi_logger::default_format)
            .start()
            .map_err(|err| ConfigError::Logging(err.to_string()))?;

        log::debug!(
            "event=logging_init level={} version={}",
            level,
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level,
            _logger: logger,
        })
    })?;

    if state.level != level {
        return Err(ConfigError::Logging(format!(
            "already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        )));
    }

    Ok(())
}

/// Active log level, if logging has been initialized.
pub fn logging_level() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.level)
}

fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}
