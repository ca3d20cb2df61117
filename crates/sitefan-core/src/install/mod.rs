//! Dependency installation into each destination root.
//!
//! The [`PackageInstaller`] trait is the seam between the loop logic here and
//! the process spawning in [`pip`]. Failures of individual installs are
//! reported and skipped; only a failed bootstrap stops the run.

pub mod pip;

use std::path::PathBuf;

use thiserror::Error;

use sitefan_schema::{DependencyDeclaration, DestinationRoot, Requirement};

use crate::Reporter;

pub use pip::PipInstaller;

/// Errors from running the package manager.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The install log could not be opened or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The interpreter could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Interpreter path.
        program: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// The invocation was killed after the bounded wait.
    #[error("{command} did not finish within {secs}s (see {log})")]
    Timeout {
        /// Rendered command line.
        command: String,
        /// Wait that expired, in seconds.
        secs: u64,
        /// Install log path.
        log: String,
    },

    /// The bootstrap step did not succeed in a root.
    #[error("Package manager bootstrap failed in {root}: {reason}")]
    BootstrapFailed {
        /// Destination root.
        root: String,
        /// Exit code or error text.
        reason: String,
    },
}

/// Result of one completed package manager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Exit status zero.
    Succeeded,
    /// Non-zero exit, or killed by a signal.
    Failed {
        /// Exit code; `None` when killed by a signal.
        code: Option<i32>,
        /// Install log holding the output.
        log: PathBuf,
    },
}

impl InstallOutcome {
    /// Whether the invocation exited successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Capability to run the package manager for one destination root.
pub trait PackageInstaller {
    /// Make sure the package manager itself is available in `root`.
    fn bootstrap(&self, root: &DestinationRoot) -> Result<InstallOutcome, InstallError>;

    /// Install a single requirement into `root`.
    fn install(
        &self,
        requirement: &Requirement,
        root: &DestinationRoot,
    ) -> Result<InstallOutcome, InstallError>;

    /// Human-readable command line for `requirement` in `root`, for progress output.
    fn describe(&self, requirement: &Requirement, root: &DestinationRoot) -> String {
        format!("install {requirement} into {root}")
    }
}

/// Tally of an install phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Invocations made.
    pub attempted: usize,
    /// Invocations that failed or timed out.
    pub failed: usize,
}

/// Bootstrap the package manager in every root, in order.
///
/// The first failure aborts with [`InstallError::BootstrapFailed`].
pub fn bootstrap_all<I, R>(
    installer: &I,
    roots: &[DestinationRoot],
    reporter: &R,
) -> Result<(), InstallError>
where
    I: PackageInstaller + ?Sized,
    R: Reporter + ?Sized,
{
    for root in roots {
        reporter.info(&format!("Bootstrapping package manager in {root}"));
        let reason = match installer.bootstrap(root) {
            Ok(InstallOutcome::Succeeded) => continue,
            Ok(InstallOutcome::Failed { code, log }) => {
                format!("exit code {code:?}, see {}", log.display())
            }
            Err(e) => e.to_string(),
        };
        return Err(InstallError::BootstrapFailed {
            root: root.to_string(),
            reason,
        });
    }
    Ok(())
}

/// Install every requirement of `declaration` into every root.
///
/// Requirements are the outer loop, roots the inner one. A failed or timed
/// out invocation is reported and the loop moves on.
pub fn install_requirements<I, R>(
    installer: &I,
    declaration: &DependencyDeclaration,
    roots: &[DestinationRoot],
    reporter: &R,
) -> InstallReport
where
    I: PackageInstaller + ?Sized,
    R: Reporter + ?Sized,
{
    let mut report = InstallReport::default();

    for requirement in declaration.requirements() {
        for root in roots {
            let command = installer.describe(&requirement, root);
            reporter.invoking(&command);
            report.attempted += 1;

            match installer.install(&requirement, root) {
                Ok(InstallOutcome::Succeeded) => {}
                Ok(InstallOutcome::Failed { code, log }) => {
                    report.failed += 1;
                    tracing::warn!(%requirement, %root, ?code, "Install failed");
                    reporter.install_failed(&command, &log);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(%requirement, %root, error = %e, "Install errored");
                    reporter.error(&e.to_string());
                }
            }
        }
    }

    report
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// What a [`RecordingInstaller`] was asked to do.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Bootstrap(DestinationRoot),
        Install(String, DestinationRoot),
    }

    /// Scripted result for the next call.
    #[derive(Debug)]
    pub(crate) enum Scripted {
        Ok(InstallOutcome),
        Timeout,
    }

    /// Test double: records calls and replays scripted outcomes
    /// (defaulting to success once the script runs out).
    #[derive(Debug, Default)]
    pub(crate) struct RecordingInstaller {
        pub(crate) calls: Mutex<Vec<Call>>,
        script: Mutex<VecDeque<Scripted>>,
    }

    impl RecordingInstaller {
        pub(crate) fn with_script(script: Vec<Scripted>) -> Self {
            Self {
                calls: Mutex::default(),
                script: Mutex::new(script.into()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, command: &str) -> Result<InstallOutcome, InstallError> {
            match self.script.lock().unwrap().pop_front() {
                None => Ok(InstallOutcome::Succeeded),
                Some(Scripted::Ok(outcome)) => Ok(outcome),
                Some(Scripted::Timeout) => Err(InstallError::Timeout {
                    command: command.to_string(),
                    secs: 60,
                    log: "pip-install.log".to_string(),
                }),
            }
        }
    }

    impl PackageInstaller for RecordingInstaller {
        fn bootstrap(&self, root: &DestinationRoot) -> Result<InstallOutcome, InstallError> {
            self.calls.lock().unwrap().push(Call::Bootstrap(root.clone()));
            self.next("bootstrap")
        }

        fn install(
            &self,
            requirement: &Requirement,
            root: &DestinationRoot,
        ) -> Result<InstallOutcome, InstallError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Install(requirement.to_string(), root.clone()));
            self.next(requirement.as_str())
        }
    }
}
