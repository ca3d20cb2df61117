//! [`PackageInstaller`] backed by each distribution's own `python -m pip`.
//!
//! Every invocation appends to `<root>/pip-install.log`: a timestamped header
//! naming the command, the child's stdout and stderr, and a trailer when the
//! command fails. The log handle is opened per invocation and closed when it
//! returns.
//!
//! The child inherits the caller's working directory, so relative roots,
//! bootstrap scripts and trust anchors resolve the same way they do for the
//! rest of the run.
//!
//! When the trust anchor is a PEM file, pip gets `--cert <file>` and one
//! `--trusted-host` per configured host, and the child environment carries
//! `SSL_CERT_FILE`, `REQUESTS_CA_BUNDLE` and `PIP_CERT` pointing at the file.

use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use sitefan_schema::{DestinationRoot, Requirement};

use super::{InstallError, InstallOutcome, PackageInstaller};
use crate::config::{ProvisionConfig, SiteLayout, TrustAnchor};

/// Environment variables pointed at the custom trust anchor.
const CERT_ENV_VARS: [&str; 3] = ["SSL_CERT_FILE", "REQUESTS_CA_BUNDLE", "PIP_CERT"];

/// Runs pip through the interpreter found in each destination root.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    layout: SiteLayout,
    trust: TrustAnchor,
    trusted_hosts: Vec<String>,
    timeout: Duration,
    bootstrap_script: Option<PathBuf>,
}

impl PipInstaller {
    /// Build an installer from the run configuration.
    pub fn new(config: &ProvisionConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            trust: config.trust.clone(),
            trusted_hosts: config.trusted_hosts.clone(),
            timeout: config.install_timeout,
            bootstrap_script: config.bootstrap_script.clone(),
        }
    }

    /// Arguments passed to the interpreter to install `requirement`.
    pub fn install_args(&self, requirement: &Requirement) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-m".into(), "pip".into(), "install".into()];
        args.push(requirement.as_str().into());
        if let Some(cert) = self.trust.file() {
            args.push("--cert".into());
            args.push(cert.as_os_str().to_owned());
            for host in &self.trusted_hosts {
                args.push("--trusted-host".into());
                args.push(host.into());
            }
        }
        args
    }

    /// Arguments passed to the interpreter to make pip available.
    ///
    /// Runs the configured bootstrap script (e.g. `get-pip.py`), or
    /// `-m ensurepip` when none is configured.
    pub fn bootstrap_args(&self) -> Vec<OsString> {
        match &self.bootstrap_script {
            Some(script) => vec![script.as_os_str().to_owned()],
            None => vec!["-m".into(), "ensurepip".into(), "--default-pip".into()],
        }
    }

    fn run(
        &self,
        root: &DestinationRoot,
        args: &[OsString],
    ) -> Result<InstallOutcome, InstallError> {
        let program = self.layout.interpreter_path(root);
        let log_path = self.layout.log_path(root);
        let command_line = render_command(&program, args);

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        writeln!(
            log,
            "==> [{}] {command_line}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log.try_clone()?));
        if let Some(cert) = self.trust.file() {
            for key in CERT_ENV_VARS {
                cmd.env(key, cert);
            }
        }

        tracing::debug!(command = %command_line, timeout = ?self.timeout, "Spawning");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                writeln!(log, "<== failed to start: {source}")?;
                return Err(InstallError::Spawn {
                    program: program.display().to_string(),
                    source,
                });
            }
        };

        let Some(status) = child.wait_timeout(self.timeout)? else {
            let _ = child.kill();
            let _ = child.wait();
            writeln!(log, "<== timed out after {}s", self.timeout.as_secs())?;
            return Err(InstallError::Timeout {
                command: command_line,
                secs: self.timeout.as_secs(),
                log: log_path.display().to_string(),
            });
        };

        if status.success() {
            return Ok(InstallOutcome::Succeeded);
        }
        write_failure(&mut log, status.code())?;
        Ok(InstallOutcome::Failed {
            code: status.code(),
            log: log_path,
        })
    }
}

fn write_failure(log: &mut File, code: Option<i32>) -> std::io::Result<()> {
    match code {
        Some(code) => writeln!(log, "<== exited with code {code}"),
        None => writeln!(log, "<== terminated by signal"),
    }
}

fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

impl PackageInstaller for PipInstaller {
    fn bootstrap(&self, root: &DestinationRoot) -> Result<InstallOutcome, InstallError> {
        self.run(root, &self.bootstrap_args())
    }

    fn install(
        &self,
        requirement: &Requirement,
        root: &DestinationRoot,
    ) -> Result<InstallOutcome, InstallError> {
        self.run(root, &self.install_args(requirement))
    }

    fn describe(&self, requirement: &Requirement, root: &DestinationRoot) -> String {
        render_command(
            &self.layout.interpreter_path(root),
            &self.install_args(requirement),
        )
    }
}
