//! Measurement orchestration
//!
//! Runs the sampling plan for one candidate: every primary target URL probed
//! `samples_per_url` times. When too few probes succeed for full statistics
//! the orchestrator retries exactly once with a reduced plan against the
//! reliable URL and flags the set as degraded.
//!
//! Probes from every candidate draw from one shared semaphore, so the number
//! of requests in flight stays bounded however the candidate and per-candidate
//! concurrency are combined. Cancellation stops new probes from starting and
//! abandons the ones in flight.

use futures::stream::{self, StreamExt};
use std::iter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SelectionConfig;
use crate::probe::{ProbeTransport, Sampler};
use crate::types::{MeasurementSet, ProxyCandidate, Sample};

/// Target URLs for one measurement
#[derive(Debug, Clone, Copy)]
pub struct MeasurementPlan<'a> {
    /// URLs of the primary plan, probed in order
    pub primary_targets: &'a [String],
    /// URL used by the reduced plan
    pub reliable_target: &'a str,
}

impl<'a> MeasurementPlan<'a> {
    #[must_use]
    pub const fn new(primary_targets: &'a [String], reliable_target: &'a str) -> Self {
        Self {
            primary_targets,
            reliable_target,
        }
    }
}

/// Samples candidates under a shared probe budget
pub struct MeasurementOrchestrator {
    transport: Arc<dyn ProbeTransport>,
    config: SelectionConfig,
    sampler: Sampler,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl MeasurementOrchestrator {
    /// Create an orchestrator whose semaphore holds
    /// [`SelectionConfig::effective_probe_permits`] permits
    #[must_use]
    pub fn new(
        transport: Arc<dyn ProbeTransport>,
        config: SelectionConfig,
        cancel: CancellationToken,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.effective_probe_permits()));
        Self {
            transport,
            sampler: Sampler::new(config.probe_timeout),
            config,
            permits,
            cancel,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Measure one candidate
    ///
    /// Never fails: probe failures are samples. A degraded set holds only the
    /// samples of the reduced plan.
    pub async fn measure(
        &self,
        candidate: &ProxyCandidate,
        plan: MeasurementPlan<'_>,
    ) -> MeasurementSet {
        let (samples, cancelled) = self
            .run(
                candidate,
                plan.primary_targets.iter().map(String::as_str),
            )
            .await;

        if cancelled {
            return Self::cut_short(candidate, samples);
        }

        let successes = samples.iter().filter(|s| s.succeeded).count();
        if successes >= self.config.min_samples_full_stats {
            debug!(
                "Candidate {} measured: {}/{} probes succeeded",
                candidate,
                successes,
                samples.len()
            );
            return MeasurementSet::new(candidate.clone(), samples);
        }

        warn!(
            "Candidate {} has {}/{} successful probes (need {}), retrying against {}",
            candidate,
            successes,
            samples.len(),
            self.config.min_samples_full_stats,
            plan.reliable_target
        );

        let (samples, cancelled) = self
            .run(candidate, iter::once(plan.reliable_target))
            .await;
        if cancelled {
            return Self::cut_short(candidate, samples);
        }

        let mut set = MeasurementSet::new(candidate.clone(), samples);
        set.degraded = true;
        debug!(
            "Candidate {} reduced plan: {}/{} probes succeeded",
            candidate,
            set.success_count(),
            set.attempt_count()
        );
        set
    }

    fn cut_short(candidate: &ProxyCandidate, samples: Vec<Sample>) -> MeasurementSet {
        debug!(
            "Measurement of {} cancelled after {} samples",
            candidate,
            samples.len()
        );
        let mut set = MeasurementSet::new(candidate.clone(), samples);
        set.degraded = true;
        set.cancelled = true;
        set
    }

    /// Probe each URL `samples_per_url` times; samples come back in plan order
    ///
    /// Returns the completed samples and whether any probe was skipped or
    /// abandoned because of cancellation.
    async fn run<'u>(
        &self,
        candidate: &ProxyCandidate,
        targets: impl Iterator<Item = &'u str>,
    ) -> (Vec<Sample>, bool) {
        let jobs = targets.flat_map(|url| iter::repeat_n(url, self.config.samples_per_url));

        let outcomes: Vec<Option<Sample>> = stream::iter(jobs)
            .map(|url| self.probe(candidate, url))
            .buffered(self.config.probe_concurrency)
            .collect()
            .await;

        let planned = outcomes.len();
        let samples: Vec<Sample> = outcomes.into_iter().flatten().collect();
        let cancelled = samples.len() < planned || self.cancel.is_cancelled();
        (samples, cancelled)
    }

    /// One probe under a semaphore permit; `None` if cancelled first
    async fn probe(&self, candidate: &ProxyCandidate, url: &str) -> Option<Sample> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let _permit = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return None,
            permit = self.permits.acquire() => permit.ok()?,
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            sample = self.sampler.sample(self.transport.as_ref(), candidate, url) => Some(sample),
        }
    }
}
