//! Console implementation of [`Reporter`].
//!
//! Progress goes to stdout, warnings and errors to stderr. `quiet` keeps
//! only section headers, warnings, and errors.

use std::path::Path;

use crossterm::style::Stylize;

use sitefan_core::Reporter;

/// A cloneable handle for writing progress to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    /// Create a new output handle.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        println!("{}", format!("==> {title}").bold());
    }

    fn extracted(&self, relative_path: &str) {
        if !self.quiet {
            println!("    {}", relative_path.dark_grey());
        }
    }

    fn invoking(&self, command_line: &str) {
        if !self.quiet {
            println!("    {command_line}");
        }
    }

    fn install_failed(&self, command_line: &str, log: &Path) {
        eprintln!(
            "{} {command_line} failed, look at {}",
            "ERROR!".red().bold(),
            log.display()
        );
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{msg}");
        }
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    fn warning(&self, msg: &str) {
        eprintln!("{} {msg}", "warning:".yellow().bold());
    }

    fn error(&self, msg: &str) {
        eprintln!("{} {msg}", "error:".red().bold());
    }
}
