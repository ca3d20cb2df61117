//! Reporter trait for dependency injection
//!
//! Core logic reports progress through this trait so it is not coupled to
//! the console output of the CLI.

use std::path::Path;

/// Progress sink for a provisioning run.
pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Downloading", "Installing").
    fn section(&self, title: &str);

    /// An archive entry was written below every destination root.
    fn extracted(&self, relative_path: &str);

    /// A package manager command is about to run.
    fn invoking(&self, command_line: &str);

    /// A package manager invocation failed; details are in `log`.
    fn install_failed(&self, command_line: &str, log: &Path);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn extracted(&self, relative_path: &str) {
        (**self).extracted(relative_path);
    }
    fn invoking(&self, command_line: &str) {
        (**self).invoking(command_line);
    }
    fn install_failed(&self, command_line: &str, log: &Path) {
        (**self).install_failed(command_line, log);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn extracted(&self, _: &str) {}
    fn invoking(&self, _: &str) {}
    fn install_failed(&self, _: &str, _: &Path) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
