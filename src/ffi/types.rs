//! C-compatible type definitions for FFI.

use std::ffi::{c_char, c_int};

/// Name of the symbol every native module must export.
pub const ENTRY_SYMBOL: &str = "run";

/// Signature of a native module entry point.
///
/// # Arguments
/// * `argc` - Number of arguments (non-negative)
/// * `argv` - Caller-owned array of `argc` NUL-terminated strings
///
/// Returns 0 on success, non-zero on failure.
pub type EntryPoint = unsafe extern "C" fn(argc: c_int, argv: *const *const c_char) -> c_int;

/// Status codes returned by the bundled entry point.
///
/// Hosts must treat any non-zero return as failure; these values only give
/// names to the codes this crate produces itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null argument array, or a null element inside it.
    NullPointer = 1,
    /// Negative argument count.
    InvalidArgument = 2,
    /// Writing to the output stream failed.
    WriteFailed = 3,
    /// The callee panicked; the panic was stopped at the boundary.
    Panicked = 4,
}

impl PolyStatus {
    /// Map a raw return code back to a known status.
    pub fn from_code(code: c_int) -> Option<Self> {
        match code {
            0 => Some(PolyStatus::Ok),
            1 => Some(PolyStatus::NullPointer),
            2 => Some(PolyStatus::InvalidArgument),
            3 => Some(PolyStatus::WriteFailed),
            4 => Some(PolyStatus::Panicked),
            _ => None,
        }
    }

    /// Raw integer value as returned across the ABI.
    #[inline]
    pub fn code(self) -> c_int {
        self as c_int
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolyStatus::Ok => "ok",
            PolyStatus::NullPointer => "null_pointer",
            PolyStatus::InvalidArgument => "invalid_argument",
            PolyStatus::WriteFailed => "write_failed",
            PolyStatus::Panicked => "panicked",
        }
    }
}

impl std::fmt::Display for PolyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip_through_from_code() {
        for status in [
            PolyStatus::Ok,
            PolyStatus::NullPointer,
            PolyStatus::InvalidArgument,
            PolyStatus::WriteFailed,
            PolyStatus::Panicked,
        ] {
            assert_eq!(PolyStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(PolyStatus::from_code(-1), None);
        assert_eq!(PolyStatus::from_code(42), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PolyStatus::NullPointer.to_string(), "null_pointer (1)");
    }
}
