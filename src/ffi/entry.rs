//! The bundled native module: an exported `run` that echoes its arguments.
//!
//! Built as part of the `cdylib`, this doubles as a smoke test for the calling
//! convention: `polyscript native target/release/libpolyscript.so a b c`.

use super::args::ArgvView;
use super::types::PolyStatus;
use std::ffi::{c_char, c_int};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

/// Write one line per argument, in order.
pub fn echo_args<W: Write>(args: &ArgvView<'_>, mut out: W) -> io::Result<()> {
    for (i, arg) in args.iter().enumerate() {
        writeln!(out, "[rust] argv[{}]: {}", i, arg.to_string_lossy())?;
    }
    out.flush()
}

/// Entry point following the polyscript native module convention.
///
/// Prints exactly `argc` lines to stdout and returns 0. Malformed input is
/// reported through the return code, never by crashing.
///
/// # Safety
/// When `argc > 0`, `argv` must point to `argc` NUL-terminated strings that
/// stay valid for the duration of the call. They are only read.
#[no_mangle]
pub unsafe extern "C" fn run(argc: c_int, argv: *const *const c_char) -> c_int {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let args = match ArgvView::from_raw(argc, argv) {
            Ok(args) => args,
            Err(err) => {
                log::warn!("event=entry_rejected argc={} reason=\"{}\"", argc, err);
                return err.status();
            }
        };

        log::debug!("event=entry_call argc={}", args.len());

        let stdout = io::stdout();
        match echo_args(&args, stdout.lock()) {
            Ok(()) => PolyStatus::Ok,
            Err(err) => {
                log::error!("event=entry_write_failed error=\"{}\"", err);
                PolyStatus::WriteFailed
            }
        }
    }));

    outcome.unwrap_or(PolyStatus::Panicked).code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::args::CArgs;

    fn echo_to_string(args: &[&str]) -> String {
        let args = CArgs::new(args).unwrap();
        let mut buf = Vec::new();
        echo_args(&args.view(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_echo_one_line_per_argument() {
        let out = echo_to_string(&["first", "second", "third"]);
        assert_eq!(
            out,
            "[rust] argv[0]: first\n[rust] argv[1]: second\n[rust] argv[2]: third\n"
        );
    }

    #[test]
    fn test_echo_empty() {
        assert_eq!(echo_to_string(&[]), "");
    }

    #[test]
    fn test_echo_is_deterministic() {
        let args = ["x", "y z", ""];
        assert_eq!(echo_to_string(&args), echo_to_string(&args));
    }

    #[test]
    fn test_run_zero_args_null_argv() {
        assert_eq!(unsafe { run(0, std::ptr::null()) }, 0);
    }

    #[test]
    fn test_run_with_args() {
        let args = CArgs::new(&["a", "b"]).unwrap();
        assert_eq!(unsafe { run(args.argc(), args.argv()) }, 0);
    }

    #[test]
    fn test_run_rejects_malformed_input() {
        assert_eq!(
            unsafe { run(-1, std::ptr::null()) },
            PolyStatus::InvalidArgument.code()
        );
        assert_eq!(
            unsafe { run(3, std::ptr::null()) },
            PolyStatus::NullPointer.code()
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_echo_propagates_write_errors() {
        let args = CArgs::new(&["a"]).unwrap();
        let err = echo_args(&args.view(), FailingWriter).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
