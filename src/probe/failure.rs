//! Probe failure classification

use serde::Serialize;
use thiserror::Error;

/// Why a single probe produced no latency value
///
/// Probe failures are recovered locally: they end up inside a failed
/// [`Sample`](crate::types::Sample) and are never propagated past the
/// measurement stage.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ProbeFailure {
    /// No response within the probe timeout
    #[error("probe timed out")]
    Timeout,

    /// TCP connection to the proxy could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// The proxy rejected the tunnel or the credentials
    #[error("proxy error: {0}")]
    Proxy(String),

    /// Target answered with a non-2xx status
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    /// Any other transport-level failure
    #[error("request failed: {0}")]
    Request(String),
}

impl ProbeFailure {
    /// Short stable label for logs and counters
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect(_) => "connect",
            Self::Proxy(_) => "proxy",
            Self::BadStatus(_) => "status",
            Self::Request(_) => "request",
        }
    }
}
