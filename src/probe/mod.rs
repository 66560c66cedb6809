//! Single-probe execution
//!
//! A probe opens one HTTP request through one candidate to one target URL
//! and times it. The [`ProbeTransport`] trait is the network seam: the
//! production implementation is [`HttpProbeTransport`], tests substitute
//! scripted transports.

mod failure;
mod http;

pub use failure::ProbeFailure;
pub use http::HttpProbeTransport;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{self, Instant};
use tracing::debug;

use crate::types::{ProxyCandidate, Sample};

/// Opens a request through a proxy candidate
///
/// Implementations should honour `timeout` themselves; the [`Sampler`]
/// enforces it again so a transport that hangs never blocks a worker.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Perform one request; `Ok` means a 2xx response arrived
    async fn probe(
        &self,
        candidate: &ProxyCandidate,
        target_url: &str,
        timeout: Duration,
    ) -> Result<(), ProbeFailure>;
}

#[async_trait]
impl<T: ProbeTransport + ?Sized> ProbeTransport for Arc<T> {
    async fn probe(
        &self,
        candidate: &ProxyCandidate,
        target_url: &str,
        timeout: Duration,
    ) -> Result<(), ProbeFailure> {
        (**self).probe(candidate, target_url, timeout).await
    }
}

/// Times probes and turns their outcome into [`Sample`]s
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    timeout: Duration,
}

impl Sampler {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run one probe; never fails, failures become failed samples
    pub async fn sample<T>(
        &self,
        transport: &T,
        candidate: &ProxyCandidate,
        target_url: &str,
    ) -> Sample
    where
        T: ProbeTransport + ?Sized,
    {
        let timestamp = SystemTime::now();
        let started = Instant::now();

        let outcome = time::timeout(
            self.timeout,
            transport.probe(candidate, target_url, self.timeout),
        )
        .await
        .unwrap_or(Err(ProbeFailure::Timeout));

        match outcome {
            Ok(()) => {
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    "Probe {} -> {} ok in {:.1}ms",
                    candidate, target_url, latency_ms
                );
                Sample::success(target_url, latency_ms, timestamp)
            }
            Err(failure) => {
                debug!(
                    "Probe {} -> {} failed ({}): {}",
                    candidate,
                    target_url,
                    failure.label(),
                    failure
                );
                Sample::failure(target_url, failure, timestamp)
            }
        }
    }
}
