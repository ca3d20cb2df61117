//! Run configuration.
//!
//! Every component receives a [`ProvisionConfig`] (or the piece of it it
//! needs) explicitly. The literal defaults below describe the stock setup:
//! NVDA sources from GitHub, fanned out into embedded Windows Python
//! distributions that sit next to each other in one directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sitefan_schema::DestinationRoot;

/// Upstream repository (`owner/name`).
pub const DEFAULT_REPOSITORY: &str = "nvaccess/nvda";
/// Base URL of the release metadata API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Base URL archives are downloaded from.
pub const DEFAULT_ARCHIVE_BASE: &str = "https://github.com";
/// Branch used for the `head` selector.
pub const DEFAULT_HEAD_BRANCH: &str = "master";
/// Archive subdirectory (below the top-level folder) that is installed.
pub const DEFAULT_SOURCE_SUBDIR: &str = "source";
/// Package directory inside each distribution.
pub const DEFAULT_SITE_LIB: &str = "Lib/site-packages";
/// Interpreter executable inside each distribution.
pub const DEFAULT_INTERPRETER: &str = "python.exe";
/// File name of the dependency declaration.
pub const DEFAULT_DECLARATION_FILE: &str = "requirements.txt";
/// Append-only install log written into each distribution.
pub const DEFAULT_INSTALL_LOG: &str = "pip-install.log";
/// Directory-name prefix used to discover distributions.
pub const DEFAULT_DIST_PREFIX: &str = "python";
/// Bounded wait for every package manager invocation.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Hosts pip is told to trust when a custom trust anchor is configured.
pub const DEFAULT_TRUSTED_HOSTS: &[&str] =
    &["pypi.org", "pypi.python.org", "files.pythonhosted.org"];
/// Environment variable naming a custom trust-anchor (PEM) file.
pub const CERT_FILE_ENV: &str = "SITEFAN_CERT_FILE";

/// Which certificates HTTPS traffic is verified against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrustAnchor {
    /// The default trust store.
    #[default]
    System,
    /// A PEM bundle on disk, used by the fetcher and passed on to pip.
    File(PathBuf),
}

impl TrustAnchor {
    /// The bundle path, if one is configured.
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::System => None,
            Self::File(path) => Some(path),
        }
    }
}

/// Relative locations inside the archive and inside each distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Archive subdirectory that is installed, relative to the top-level folder.
    pub source_subdir: String,
    /// Package directory, relative to a distribution root.
    pub site_lib: PathBuf,
    /// Interpreter, relative to a distribution root.
    pub interpreter: PathBuf,
    /// File name of the dependency declaration, matched as a path suffix.
    pub declaration_file: String,
    /// Install log file name, relative to a distribution root.
    pub install_log: String,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            source_subdir: DEFAULT_SOURCE_SUBDIR.to_string(),
            site_lib: PathBuf::from(DEFAULT_SITE_LIB),
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            declaration_file: DEFAULT_DECLARATION_FILE.to_string(),
            install_log: DEFAULT_INSTALL_LOG.to_string(),
        }
    }
}

impl SiteLayout {
    /// `<root>/<site_lib>`
    pub fn site_dir(&self, root: &DestinationRoot) -> PathBuf {
        root.join(&self.site_lib)
    }

    /// `<root>/<interpreter>`
    pub fn interpreter_path(&self, root: &DestinationRoot) -> PathBuf {
        root.join(&self.interpreter)
    }

    /// `<root>/<install_log>`
    pub fn log_path(&self, root: &DestinationRoot) -> PathBuf {
        root.join(&self.install_log)
    }
}

/// Everything a provisioning run needs to know.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Upstream repository (`owner/name`).
    pub repository: String,
    /// Release metadata API base URL.
    pub api_base: String,
    /// Archive download base URL.
    pub archive_base: String,
    /// Branch fetched for the `head` selector.
    pub head_branch: String,
    /// Archive and distribution layout.
    pub layout: SiteLayout,
    /// Certificates used for HTTPS, here and inside pip.
    pub trust: TrustAnchor,
    /// Hosts passed to pip as `--trusted-host` when [`trust`](Self::trust) is a file.
    pub trusted_hosts: Vec<String>,
    /// Bounded wait for each package manager invocation.
    pub install_timeout: Duration,
    /// Script run with each distribution's interpreter before installing requirements.
    pub bootstrap_script: Option<PathBuf>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            archive_base: DEFAULT_ARCHIVE_BASE.to_string(),
            head_branch: DEFAULT_HEAD_BRANCH.to_string(),
            layout: SiteLayout::default(),
            trust: TrustAnchor::System,
            trusted_hosts: DEFAULT_TRUSTED_HOSTS.iter().map(ToString::to_string).collect(),
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            bootstrap_script: None,
        }
    }
}

impl ProvisionConfig {
    /// `{api_base}/repos/{repository}/releases/latest`
    pub fn release_metadata_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.repository
        )
    }

    /// `{archive_base}/{repository}/archive/refs/tags/{tag}.zip`
    pub fn tag_archive_url(&self, tag: &str) -> String {
        format!(
            "{}/{}/archive/refs/tags/{tag}.zip",
            self.archive_base.trim_end_matches('/'),
            self.repository
        )
    }

    /// `{archive_base}/{repository}/archive/refs/heads/{head_branch}.zip`
    pub fn head_archive_url(&self) -> String {
        format!(
            "{}/{}/archive/refs/heads/{}.zip",
            self.archive_base.trim_end_matches('/'),
            self.repository,
            self.head_branch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = ProvisionConfig::default();
        assert_eq!(
            config.release_metadata_url(),
            "https://api.github.com/repos/nvaccess/nvda/releases/latest"
        );
        assert_eq!(
            config.tag_archive_url("release-2024.1"),
            "https://github.com/nvaccess/nvda/archive/refs/tags/release-2024.1.zip"
        );
        assert_eq!(
            config.head_archive_url(),
            "https://github.com/nvaccess/nvda/archive/refs/heads/master.zip"
        );
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let config = ProvisionConfig {
            archive_base: "http://127.0.0.1:1234/".to_string(),
            repository: "acme/tool".to_string(),
            ..ProvisionConfig::default()
        };
        assert_eq!(
            config.tag_archive_url("v1"),
            "http://127.0.0.1:1234/acme/tool/archive/refs/tags/v1.zip"
        );
    }

    #[test]
    fn test_layout_paths() {
        let layout = SiteLayout::default();
        let root = DestinationRoot::new("/dists/python311");
        assert_eq!(
            layout.site_dir(&root),
            PathBuf::from("/dists/python311/Lib/site-packages")
        );
        assert_eq!(
            layout.interpreter_path(&root),
            PathBuf::from("/dists/python311/python.exe")
        );
        assert_eq!(
            layout.log_path(&root),
            PathBuf::from("/dists/python311/pip-install.log")
        );
    }

    #[test]
    fn test_trust_anchor_file() {
        assert_eq!(TrustAnchor::System.file(), None);
        let anchor = TrustAnchor::File(PathBuf::from("/etc/corp.pem"));
        assert_eq!(anchor.file(), Some(Path::new("/etc/corp.pem")));
    }
}
