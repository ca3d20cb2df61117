//! HTTP client construction and the single archive download.

use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;

use crate::config::TrustAnchor;

/// Errors from building the client or downloading the archive.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure or non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The trust anchor file could not be read.
    #[error("Failed to read trust anchor {path}: {source}")]
    TrustAnchorRead {
        /// Configured bundle path.
        path: String,
        /// Underlying read error.
        source: std::io::Error,
    },

    /// The trust anchor file is not a valid PEM bundle.
    #[error("Invalid trust anchor {path}: {source}")]
    TrustAnchorParse {
        /// Configured bundle path.
        path: String,
        /// Parse error reported by the TLS backend.
        source: reqwest::Error,
    },

    /// The trust anchor file parsed but holds no certificate.
    #[error("Trust anchor {path} contains no PEM certificates")]
    NoCertificates {
        /// Configured bundle path.
        path: String,
    },
}

/// Build the HTTP client shared by the resolver and the fetcher.
///
/// A [`TrustAnchor::File`] is added as an extra root certificate. A bundle
/// that cannot be read or parsed is an error rather than a silent fallback to
/// the default store.
pub fn build_client(trust: &TrustAnchor) -> Result<Client, FetchError> {
    let mut builder = Client::builder().user_agent(crate::USER_AGENT);

    if let Some(path) = trust.file() {
        let pem = std::fs::read(path).map_err(|source| FetchError::TrustAnchorRead {
            path: path.display().to_string(),
            source,
        })?;
        let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|source| {
            FetchError::TrustAnchorParse {
                path: path.display().to_string(),
                source,
            }
        })?;
        if certs.is_empty() {
            return Err(FetchError::NoCertificates {
                path: path.display().to_string(),
            });
        }
        tracing::debug!(path = %path.display(), count = certs.len(), "Adding trust anchor");
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    Ok(builder.build()?)
}

/// Download `url` and buffer the whole body in memory. No retry.
pub async fn fetch_archive(client: &Client, url: &str) -> Result<Bytes, FetchError> {
    tracing::debug!(url, "Fetching archive");
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes().await?;
    tracing::debug!(url, bytes = body.len(), "Archive downloaded");
    Ok(body)
}
