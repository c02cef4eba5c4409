//! Language bridges.
//!
//! Each [`Language`] is run through an external toolchain, either directly
//! (`node script.js ...`) or by compiling to a temporary artifact first and
//! running that. Bridges first build a [`Plan`], a list of command
//! invocations plus the artifacts to delete afterwards, and only then
//! execute it.
//!
//! With the `python` feature, `py` scripts run in an embedded interpreter
//! instead of a `python3` subprocess. The script sees the same
//! `sys.argv == [script, args...]` either way.

mod language;
mod plan;
#[cfg(feature = "python")]
mod python;

pub use language::{BridgeKind, Language};
pub use plan::{Invocation, Plan, Step};

use crate::error::BridgeError;
use std::path::Path;

/// Run `script` with `args` through the bridge for `lang`.
pub fn run_script<S: AsRef<str>>(
    lang: Language,
    script: &str,
    args: &[S],
    tmp_dir: &Path,
) -> Result<(), BridgeError> {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();

    #[cfg(feature = "python")]
    if lang == Language::Python {
        log::info!("event=bridge_run lang=py script={} mode=embedded", script);
        return python::run_embedded(script, &args);
    }

    let plan = lang.plan(script, &args, tmp_dir);
    log::info!(
        "event=bridge_run lang={} script={} steps={}",
        lang.name(),
        script,
        plan.steps().len()
    );
    plan.execute()
}
