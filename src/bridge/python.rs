//! In-process Python through an embedded interpreter.

use crate::error::BridgeError;
use pyo3::exceptions::PySystemExit;
use pyo3::prelude::*;
use pyo3::types::PyList;

/// Run `script` in the embedded interpreter with `sys.argv = [script, args...]`.
///
/// `sys.exit()` / `sys.exit(0)` count as success. Any other exception is
/// printed to stderr with its traceback and returned as [`BridgeError::Python`].
pub fn run_embedded(script: &str, args: &[String]) -> Result<(), BridgeError> {
    let code = std::fs::read_to_string(script).map_err(|source| BridgeError::Read {
        path: script.to_string(),
        source,
    })?;

    Python::with_gil(|py| {
        let argv: Vec<&str> = std::iter::once(script)
            .chain(args.iter().map(String::as_str))
            .collect();

        let result = py
            .import_bound("sys")
            .and_then(|sys| sys.setattr("argv", PyList::new_bound(py, &argv)))
            .and_then(|()| py.run_bound(&code, None, None));

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_instance_of::<PySystemExit>(py) => exit_status(py, &err),
            Err(err) => {
                err.print(py);
                Err(BridgeError::Python(err.to_string()))
            }
        }
    })
}

// `PyErr::print` on a `SystemExit` would end the host process, so the exit
// code is read here instead.
fn exit_status(py: Python<'_>, err: &PyErr) -> Result<(), BridgeError> {
    let code = err.value_bound(py).getattr("code").ok();
    let clean = match &code {
        None => false,
        Some(code) => code.is_none() || code.extract::<i64>().map_or(false, |n| n == 0),
    };
    if clean {
        Ok(())
    } else {
        Err(BridgeError::Python(err.to_string()))
    }
}
