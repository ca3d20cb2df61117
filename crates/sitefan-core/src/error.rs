//! Run-level error aggregating the per-step errors.

use thiserror::Error;

use crate::install::InstallError;
use crate::io::fetch::FetchError;
use crate::io::materialize::MaterializeError;
use crate::resolver::ResolveError;

/// Every error that aborts a provisioning run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The version selector could not be turned into a URL.
    #[error("Failed to resolve archive: {0}")]
    Resolve(#[from] ResolveError),

    /// Building the client or downloading the archive failed.
    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    /// The archive could not be read or written out.
    #[error("Extraction failed: {0}")]
    Materialize(#[from] MaterializeError),

    /// Bootstrapping the package manager failed.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// A blocking step panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
