//! sitefan - fan a project's source tree out into Python distributions
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Downloads a source archive (by default NVDA from GitHub), copies its
//! `source/` tree into `Lib/site-packages` of every Python distribution found
//! next to each other, then installs the project's `requirements.txt` into
//! each distribution with pip.
//!
//! # Directory Layout
//!
//! ```text
//! <root>/
//! ├── python37-32/
//! │   ├── python.exe
//! │   ├── pip-install.log     # appended on every run
//! │   └── Lib/site-packages/  # receives <archive>/source/**
//! └── python311-64/
//!     └── ...
//! ```

pub mod cmd;
pub mod discover;
pub mod ui;

use clap::Parser;
use std::path::PathBuf;

use sitefan_core::config::{
    CERT_FILE_ENV, DEFAULT_API_BASE, DEFAULT_ARCHIVE_BASE, DEFAULT_DIST_PREFIX,
    DEFAULT_REPOSITORY,
};
use sitefan_schema::VersionSelector;

#[derive(Debug, Parser)]
#[command(name = "sitefan")]
#[command(
    author,
    version = env!("SITEFAN_VERSION"),
    about = "Fan a project's source tree out into Python distributions"
)]
pub struct Cli {
    /// Version to fetch: "latest" release, "head" of the default branch, or a tag
    #[arg(long, default_value = "latest")]
    pub tag: VersionSelector,

    /// Source repository (owner/name)
    #[arg(long, env = "SITEFAN_REPO", default_value = DEFAULT_REPOSITORY)]
    pub repo: String,

    /// Directory scanned for Python distributions (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Name prefix of distribution directories inside --root
    #[arg(long, default_value = DEFAULT_DIST_PREFIX)]
    pub prefix: String,

    /// Explicit distribution directory (repeatable); disables scanning
    #[arg(long = "dist", value_name = "DIR")]
    pub dists: Vec<PathBuf>,

    /// PEM bundle used for HTTPS verification here and inside pip
    #[arg(long, env = CERT_FILE_ENV)]
    pub cert: Option<PathBuf>,

    /// Script run with each distribution's interpreter before installing (e.g. get-pip.py)
    #[arg(long, value_name = "SCRIPT")]
    pub bootstrap: Option<PathBuf>,

    /// Seconds to wait for each pip invocation
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Stop after extracting sources
    #[arg(long)]
    pub skip_install: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Release metadata API base URL
    #[arg(long, env = "SITEFAN_API_BASE", default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,

    /// Archive download base URL
    #[arg(long, env = "SITEFAN_ARCHIVE_BASE", default_value = DEFAULT_ARCHIVE_BASE, hide = true)]
    pub archive_base: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["sitefan"]);
        assert_eq!(cli.tag, VersionSelector::Latest);
        assert_eq!(cli.prefix, "python");
        assert_eq!(cli.timeout, 60);
        assert!(cli.dists.is_empty());
        assert!(!cli.skip_install);
    }

    #[test]
    fn test_tag_and_repeated_dist() {
        let cli = Cli::parse_from([
            "sitefan",
            "--tag",
            "release-2024.1",
            "--dist",
            "a",
            "--dist",
            "b",
        ]);
        assert_eq!(cli.tag, VersionSelector::Tag("release-2024.1".into()));
        assert_eq!(cli.dists, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn test_empty_tag_rejected() {
        assert!(Cli::try_parse_from(["sitefan", "--tag", ""]).is_err());
    }
}
