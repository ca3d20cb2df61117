//! sitefan core: resolve a source archive, fan its `source/` tree out into
//! Python distributions, and install the declared requirements with pip.
//!
//! The pipeline is strictly sequential:
//!
//! 1. [`resolver::resolve_archive_url`] turns a version selector into a URL.
//! 2. [`io::fetch::fetch_archive`] downloads the archive into memory.
//! 3. [`io::materialize::materialize`] writes the selected entries into every
//!    destination root and returns the dependency declaration.
//! 4. [`install::install_requirements`] runs the package manager per
//!    requirement and root through the [`install::PackageInstaller`] seam.

pub mod config;
pub mod error;
pub mod install;
pub mod io;
pub mod reporter;
pub mod resolver;

pub use config::{ProvisionConfig, SiteLayout, TrustAnchor};
pub use error::ProvisionError;
pub use reporter::{NullReporter, Reporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("sitefan/", env!("CARGO_PKG_VERSION"));
