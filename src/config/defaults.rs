//! Default values for configuration fields
//!
//! This module centralizes the default functions used by serde deserialization.

use crate::constants::{channel, probe, selection, source};
use crate::types::limits::MaxCandidates;
use std::time::Duration;

#[inline]
pub fn probe_timeout() -> Duration {
    Duration::from_millis(selection::PROBE_TIMEOUT_MS)
}

#[inline]
pub fn target_urls() -> Vec<String> {
    probe::DEFAULT_TARGET_URLS
        .iter()
        .map(|url| (*url).to_string())
        .collect()
}

#[inline]
pub fn user_agent() -> String {
    probe::USER_AGENT.to_string()
}

/// Accept invalid TLS certificates on probe targets
///
/// Free proxies frequently intercept TLS; the probe measures reachability,
/// not certificate hygiene.
#[inline]
pub fn accept_invalid_certs() -> bool {
    true
}

#[inline]
pub fn source_url() -> String {
    source::PROXY_LIST_URL.to_string()
}

#[inline]
pub fn region() -> String {
    source::DEFAULT_REGION.to_string()
}

#[inline]
pub fn default_password() -> String {
    source::DEFAULT_PASSWORD.to_string()
}

#[inline]
pub fn max_candidates() -> MaxCandidates {
    MaxCandidates::default()
}

#[inline]
pub fn fetch_timeout() -> Duration {
    Duration::from_millis(source::FETCH_TIMEOUT_MS)
}

#[inline]
pub fn channel_request_timeout() -> Duration {
    Duration::from_millis(channel::REQUEST_TIMEOUT_MS)
}
