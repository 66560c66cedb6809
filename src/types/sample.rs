//! Raw probe results and per-candidate measurement sets

use serde::Serialize;
use std::time::SystemTime;

use super::ProxyCandidate;
use crate::probe::ProbeFailure;

/// Outcome of one timed probe through a candidate to a target URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub target_url: String,
    pub succeeded: bool,
    /// Wall-clock duration; `None` for failed probes
    pub latency_ms: Option<f64>,
    pub timestamp: SystemTime,
    /// Failure classification; `None` for successful probes
    pub failure: Option<ProbeFailure>,
}

impl Sample {
    #[must_use]
    pub fn success(target_url: impl Into<String>, latency_ms: f64, timestamp: SystemTime) -> Self {
        Self {
            target_url: target_url.into(),
            succeeded: true,
            latency_ms: Some(latency_ms),
            timestamp,
            failure: None,
        }
    }

    #[must_use]
    pub fn failure(
        target_url: impl Into<String>,
        failure: ProbeFailure,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            succeeded: false,
            latency_ms: None,
            timestamp,
            failure: Some(failure),
        }
    }

    /// Latency of a successful sample
    #[inline]
    #[must_use]
    pub fn success_latency(&self) -> Option<f64> {
        if self.succeeded { self.latency_ms } else { None }
    }
}

/// All samples taken for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSet {
    pub candidate: ProxyCandidate,
    pub samples: Vec<Sample>,
    /// The reduced fallback plan produced these samples, or the run was
    /// cancelled part-way
    pub degraded: bool,
    /// Measurement stopped early because the run was cancelled
    pub cancelled: bool,
}

impl MeasurementSet {
    #[must_use]
    pub fn new(candidate: ProxyCandidate, samples: Vec<Sample>) -> Self {
        Self {
            candidate,
            samples,
            degraded: false,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.samples.iter().filter(|s| s.succeeded).count()
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.samples.len()
    }

    /// Latencies of successful samples, in probe order
    #[must_use]
    pub fn latencies(&self) -> Vec<f64> {
        successful_latencies(&self.samples)
    }
}

/// Latencies of successful samples, in probe order
#[must_use]
pub fn successful_latencies(samples: &[Sample]) -> Vec<f64> {
    samples.iter().filter_map(Sample::success_latency).collect()
}
