//! Turns a [`VersionSelector`] into the archive download URL.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use sitefan_schema::VersionSelector;

use crate::config::ProvisionConfig;

/// Errors while looking up the latest release.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The metadata request failed or returned a non-success status.
    #[error("Failed to query release metadata at {url}: {source}")]
    Http {
        /// Metadata endpoint.
        url: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// The metadata body has no usable `tag_name`.
    #[error("Unexpected release metadata from {url}: {source}")]
    Metadata {
        /// Metadata endpoint.
        url: String,
        /// Deserialization error.
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Resolve the archive URL for `selector`.
///
/// Only [`VersionSelector::Latest`] touches the network: it reads the newest
/// release's `tag_name` from the metadata endpoint. Any failure there is
/// returned as-is; there is no fallback to `head`.
pub async fn resolve_archive_url(
    client: &Client,
    config: &ProvisionConfig,
    selector: &VersionSelector,
) -> Result<String, ResolveError> {
    match selector {
        VersionSelector::Head => Ok(config.head_archive_url()),
        VersionSelector::Tag(tag) => Ok(config.tag_archive_url(tag)),
        VersionSelector::Latest => {
            let tag = latest_tag(client, config).await?;
            tracing::debug!(%tag, "Resolved latest release");
            Ok(config.tag_archive_url(&tag))
        }
    }
}

async fn latest_tag(client: &Client, config: &ProvisionConfig) -> Result<String, ResolveError> {
    let url = config.release_metadata_url();
    let http_err = |source| ResolveError::Http {
        url: url.clone(),
        source,
    };

    let body = client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(http_err)?
        .error_for_status()
        .map_err(http_err)?
        .text()
        .await
        .map_err(http_err)?;

    let release: LatestRelease =
        serde_json::from_str(&body).map_err(|source| ResolveError::Metadata {
            url: url.clone(),
            source,
        })?;

    Ok(release.tag_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn config_for(server: &Server) -> ProvisionConfig {
        ProvisionConfig {
            api_base: server.url(),
            archive_base: "https://archives.example".to_string(),
            repository: "acme/tool".to_string(),
            ..ProvisionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_latest_uses_release_tag() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/tool/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "release-2024.1", "draft": false, "assets": []}"#)
            .create_async()
            .await;

        let config = config_for(&server);
        let url = resolve_archive_url(&Client::new(), &config, &VersionSelector::Latest)
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://archives.example/acme/tool/archive/refs/tags/release-2024.1.zip"
        );
    }

    #[tokio::test]
    async fn test_head_and_tag_skip_network() {
        // No mocks registered: any request would fail.
        let server = Server::new_async().await;
        let config = config_for(&server);
        let client = Client::new();

        let head = resolve_archive_url(&client, &config, &VersionSelector::Head)
            .await
            .unwrap();
        assert_eq!(
            head,
            "https://archives.example/acme/tool/archive/refs/heads/master.zip"
        );

        let tag = resolve_archive_url(&client, &config, &VersionSelector::Tag("v2".into()))
            .await
            .unwrap();
        assert_eq!(
            tag,
            "https://archives.example/acme/tool/archive/refs/tags/v2.zip"
        );
    }

    #[tokio::test]
    async fn test_unexpected_metadata_shape_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/tool/releases/latest")
            .with_status(200)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let config = config_for(&server);
        let err = resolve_archive_url(&Client::new(), &config, &VersionSelector::Latest)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Metadata { .. }));
    }

    #[tokio::test]
    async fn test_metadata_http_failure_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/tool/releases/latest")
            .with_status(403)
            .create_async()
            .await;

        let config = config_for(&server);
        let err = resolve_archive_url(&Client::new(), &config, &VersionSelector::Latest)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Http { .. }));
    }
}
