//! Candidate list source
//!
//! The list is a markdown document whose table rows look like
//! `| 203.0.113.7:8080 | 香港 | user123 |`. Every username shares one
//! password.

use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::types::{ProxyCandidate, ProxyCredential, Username};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch proxy list from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("proxy list {url} answered HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Download the proxy list document
pub async fn fetch_document(url: &str, timeout: Duration) -> Result<String, SourceError> {
    let fetch_err = |source| SourceError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;
    let response = client.get(url).send().await.map_err(fetch_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(fetch_err)
}

/// Extract candidates for `region` from the markdown table
///
/// Rows need at least three non-empty columns (`ip:port`, region, user);
/// rows for other regions or without an IPv4 endpoint are skipped. The
/// first occurrence of each endpoint wins.
#[must_use]
pub fn parse_candidates(
    markdown: &str,
    region: &str,
    default_password: &str,
) -> Vec<ProxyCandidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for line in markdown.lines().map(str::trim) {
        if !line.starts_with('|') || line.starts_with("|---") {
            continue;
        }
        let columns: Vec<&str> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        let &[endpoint, row_region, user, ..] = columns.as_slice() else {
            continue;
        };
        if row_region != region {
            continue;
        }

        let Ok(username) = Username::new(user.to_string()) else {
            continue;
        };
        let credential = ProxyCredential::new(username, default_password);
        match ProxyCandidate::from_ipv4_endpoint(endpoint, Some(credential)) {
            Ok(candidate) => {
                if seen.insert(candidate.endpoint()) {
                    candidates.push(candidate);
                }
            }
            Err(e) => debug!("Skipping row '{}': {}", endpoint, e),
        }
    }

    candidates
}

/// Fetch, parse and truncate the candidate list described by `config`
pub async fn load_candidates(config: &SourceConfig) -> Result<Vec<ProxyCandidate>, SourceError> {
    info!("Fetching proxy list from {}", config.url);
    let document = fetch_document(&config.url, config.fetch_timeout).await?;

    let mut candidates = parse_candidates(&document, &config.region, &config.default_password);
    let found = candidates.len();
    candidates.truncate(config.max_candidates.get());

    info!(
        "Found {} candidates for region {}, keeping {}",
        found,
        config.region,
        candidates.len()
    );
    Ok(candidates)
}
