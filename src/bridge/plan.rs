//! Command plans and their execution.

use crate::error::BridgeError;
use std::path::PathBuf;
use std::process::Command;

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run with inherited stdio and wait for the exit status.
    fn status(&self) -> Result<std::process::ExitStatus, BridgeError> {
        Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| BridgeError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Build an artifact; failure aborts the plan.
    Compile(Invocation),
    /// Run the script or the built artifact.
    Run(Invocation),
}

/// Ordered steps plus the files they leave behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<Step>,
    artifacts: Vec<PathBuf>,
}

impl Plan {
    pub fn new(steps: Vec<Step>, artifacts: Vec<PathBuf>) -> Self {
        Self { steps, artifacts }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Files removed once the plan finishes.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Execute each step in order, stopping at the first failure.
    ///
    /// Artifacts are removed afterwards regardless of the outcome.
    pub fn execute(&self) -> Result<(), BridgeError> {
        let result = self.run_steps();
        self.cleanup();
        result
    }

    fn run_steps(&self) -> Result<(), BridgeError> {
        for step in &self.steps {
            match step {
                Step::Compile(inv) => {
                    log::debug!("event=bridge_compile program={} args={:?}", inv.program, inv.args);
                    let status = inv.status()?;
                    if !status.success() {
                        return Err(BridgeError::Compile {
                            compiler: inv.program.clone(),
                            status,
                        });
                    }
                }
                Step::Run(inv) => {
                    log::debug!("event=bridge_exec program={} args={:?}", inv.program, inv.args);
                    let status = inv.status()?;
                    if !status.success() {
                        return Err(BridgeError::Exit {
                            program: inv.program.clone(),
                            status,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn cleanup(&self) {
        for artifact in &self.artifacts {
            match std::fs::remove_file(artifact) {
                Ok(()) => log::debug!("event=artifact_removed path={}", artifact.display()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => log::warn!(
                    "event=artifact_remove_failed path={} error=\"{}\"",
                    artifact.display(),
                    err
                ),
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_successful_plan() {
        let plan = Plan::new(vec![Step::Run(sh("exit 0"))], Vec::new());
        plan.execute().unwrap();
    }

    #[test]
    fn test_run_failure() {
        let plan = Plan::new(vec![Step::Run(sh("exit 3"))], Vec::new());
        match plan.execute() {
            Err(BridgeError::Exit { program, status }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_compile_failure_skips_run_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("built");
        let marker = dir.path().join("ran");

        let plan = Plan::new(
            vec![
                Step::Compile(sh(&format!("touch {} && exit 1", artifact.display()))),
                Step::Run(sh(&format!("touch {}", marker.display()))),
            ],
            vec![artifact.clone()],
        );

        assert!(matches!(plan.execute(), Err(BridgeError::Compile { .. })));
        assert!(!artifact.exists());
        assert!(!marker.exists());
    }

    #[test]
    fn test_missing_program() {
        let plan = Plan::new(
            vec![Step::Run(Invocation::new("polyscript-no-such-tool", Vec::new()))],
            Vec::new(),
        );
        assert!(matches!(plan.execute(), Err(BridgeError::Spawn { .. })));
    }
}
