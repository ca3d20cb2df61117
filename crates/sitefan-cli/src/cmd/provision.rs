//! The provisioning run: resolve, download, extract, install.

use std::sync::Arc;
use std::time::Duration;

use sitefan_core::install::{self, InstallReport, PackageInstaller};
use sitefan_core::io::{fetch, materialize};
use sitefan_core::{ProvisionConfig, ProvisionError, Reporter, TrustAnchor, resolver};
use sitefan_schema::{DestinationRoot, VersionSelector};

use crate::Cli;
use crate::discover::discover_roots;

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    /// Archive that was downloaded.
    pub url: String,
    /// Number of destination roots written to.
    pub roots: usize,
    /// Install tally; `None` when installation was skipped.
    pub install: Option<InstallReport>,
}

/// Build the run configuration from command-line arguments.
pub fn config_from_cli(cli: &Cli) -> ProvisionConfig {
    let trust = cli
        .cert
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or(TrustAnchor::System, TrustAnchor::File);

    ProvisionConfig {
        repository: cli.repo.clone(),
        api_base: cli.api_base.clone(),
        archive_base: cli.archive_base.clone(),
        trust,
        install_timeout: Duration::from_secs(cli.timeout),
        bootstrap_script: cli.bootstrap.clone(),
        ..ProvisionConfig::default()
    }
}

/// Destination roots: the explicit `--dist` list, or a scan of `--root`.
pub fn roots_from_cli(cli: &Cli) -> std::io::Result<Vec<DestinationRoot>> {
    if !cli.dists.is_empty() {
        return Ok(cli.dists.iter().cloned().map(DestinationRoot::new).collect());
    }
    let dir = match &cli.root {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    discover_roots(&dir, &cli.prefix)
}

/// Run the whole pipeline, one step after the other.
///
/// Any error returned here is fatal. Failed requirement installs are not
/// errors; they are counted in [`ProvisionSummary::install`].
pub async fn provision<I, R>(
    config: &ProvisionConfig,
    selector: &VersionSelector,
    roots: Vec<DestinationRoot>,
    installer: Arc<I>,
    reporter: Arc<R>,
    skip_install: bool,
) -> Result<ProvisionSummary, ProvisionError>
where
    I: PackageInstaller + Send + Sync + 'static,
    R: Reporter + 'static,
{
    reporter.section(&format!("Resolving {} ({selector})", config.repository));
    let client = fetch::build_client(&config.trust)?;
    let url = resolver::resolve_archive_url(&client, config, selector).await?;

    reporter.section(&format!("Downloading {url}"));
    let archive = fetch::fetch_archive(&client, &url).await?;
    reporter.success("DONE!");

    reporter.section(&format!("Extracting into {} distribution(s)", roots.len()));
    for root in &roots {
        reporter.info(&format!("  {root}"));
    }
    let roots = Arc::new(roots);
    let declaration = {
        let roots = Arc::clone(&roots);
        let layout = config.layout.clone();
        let reporter = Arc::clone(&reporter);
        tokio::task::spawn_blocking(move || {
            materialize::materialize(&archive, &roots, &layout, reporter.as_ref())
        })
        .await??
    };
    reporter.success("DONE!");

    let mut summary = ProvisionSummary {
        url,
        roots: roots.len(),
        install: None,
    };
    if skip_install {
        return Ok(summary);
    }

    if config.bootstrap_script.is_some() {
        reporter.section("Bootstrapping pip");
        let roots = Arc::clone(&roots);
        let installer = Arc::clone(&installer);
        let reporter = Arc::clone(&reporter);
        tokio::task::spawn_blocking(move || {
            install::bootstrap_all(installer.as_ref(), &roots, reporter.as_ref())
        })
        .await??;
    }

    reporter.section("Installing pip dependencies");
    let report = {
        let reporter = Arc::clone(&reporter);
        tokio::task::spawn_blocking(move || {
            install::install_requirements(
                installer.as_ref(),
                &declaration,
                &roots,
                reporter.as_ref(),
            )
        })
        .await?
    };
    if report.failed == 0 {
        reporter.success("DONE!");
    } else {
        reporter.warning(&format!(
            "{} of {} install(s) failed",
            report.failed, report.attempted
        ));
    }

    summary.install = Some(report);
    Ok(summary)
}

/// Entry point for the `sitefan` binary.
pub async fn run(cli: &Cli, reporter: Arc<crate::ui::Output>) -> anyhow::Result<ProvisionSummary> {
    use anyhow::Context;

    let config = config_from_cli(cli);
    let roots = roots_from_cli(cli).context("Failed to discover Python distributions")?;
    if roots.is_empty() {
        reporter.warning(&format!(
            "No distributions found (directories starting with '{}'); nothing will be written",
            cli.prefix
        ));
    }
    let installer = Arc::new(install::PipInstaller::new(&config));

    let summary = provision(&config, &cli.tag, roots, installer, reporter, cli.skip_install).await?;
    Ok(summary)
}
