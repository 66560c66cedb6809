//! Candidate selection
//!
//! Measures every candidate under one shared probe budget, evaluates the
//! measurement sets and returns the ranking with its winner.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ConfigError, SelectionConfig};
use crate::evaluate::{Evaluator, ScoreReport, rank};
use crate::measure::{MeasurementOrchestrator, MeasurementPlan};
use crate::probe::ProbeTransport;
use crate::types::ProxyCandidate;

/// Outcome of one selection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    /// Best qualifying candidate, if any qualified
    pub winner: Option<ProxyCandidate>,
    /// Every candidate, qualifying ones first
    pub ranking: Vec<ScoreReport>,
    /// The run was cancelled before every probe completed
    pub cancelled: bool,
}

impl SelectionResult {
    #[must_use]
    pub fn winner_report(&self) -> Option<&ScoreReport> {
        self.ranking.first().filter(|r| r.qualifies)
    }

    #[must_use]
    pub fn qualified_count(&self) -> usize {
        self.ranking.iter().filter(|r| r.qualifies).count()
    }

    /// One line per candidate: rank, endpoint, score, P95, success rate, reason
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.ranking
            .iter()
            .enumerate()
            .map(|(i, report)| {
                let mut line = format!(
                    "#{} {} score={:.4}",
                    i + 1,
                    report.candidate.endpoint(),
                    report.composite_score
                );
                match report.stats.basic.p95 {
                    Some(p95) => {
                        let _ = write!(line, " p95={p95:.1}ms");
                    }
                    None => line.push_str(" p95=-"),
                }
                let _ = write!(
                    line,
                    " success={}/{}",
                    report.stats.success_count, report.stats.attempt_count
                );
                if report.degraded {
                    line.push_str(" degraded");
                }
                if let Some(reason) = report.reason {
                    let _ = write!(line, " disqualified={reason}");
                }
                line
            })
            .collect()
    }
}

/// Runs selection over a candidate list
pub struct Selector {
    orchestrator: MeasurementOrchestrator,
}

impl Selector {
    #[must_use]
    pub fn new(
        transport: Arc<dyn ProbeTransport>,
        config: SelectionConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator: MeasurementOrchestrator::new(transport, config, cancel),
        }
    }

    /// Measure, evaluate and rank `candidates`
    ///
    /// The primary plan uses the first `target_url_count` URLs of
    /// `target_urls`; the reduced plan uses `reliable_url`, falling back to
    /// the first target URL. An empty candidate list yields an empty result.
    pub async fn select(
        &self,
        candidates: &[ProxyCandidate],
        target_urls: &[String],
        reliable_url: Option<&str>,
    ) -> Result<SelectionResult, ConfigError> {
        let config = self.orchestrator.config();
        let plan = plan_for(target_urls, reliable_url, config.target_url_count)?;

        info!(
            "Measuring {} candidates against {} target URLs ({} samples each)",
            candidates.len(),
            plan.primary_targets.len(),
            config.samples_per_url
        );

        let measurements: Vec<_> = stream::iter(candidates)
            .map(|candidate| self.orchestrator.measure(candidate, plan))
            .buffered(config.candidate_concurrency)
            .collect()
            .await;

        let cancelled = self.orchestrator.cancel_token().is_cancelled()
            || measurements.iter().any(|m| m.cancelled);

        let evaluator = Evaluator::new(config);
        let reports: Vec<ScoreReport> = measurements
            .iter()
            .map(|measurement| {
                let report = evaluator.evaluate(measurement);
                match report.reason {
                    Some(reason) => warn!(
                        "Candidate {} disqualified ({}): {}/{} probes succeeded",
                        report.candidate,
                        reason,
                        report.stats.success_count,
                        report.stats.attempt_count
                    ),
                    None => info!(
                        "Candidate {} scored {:.4}",
                        report.candidate, report.composite_score
                    ),
                }
                report
            })
            .collect();

        let ranking = rank(reports);
        let winner = ranking
            .first()
            .filter(|r| r.qualifies)
            .map(|r| r.candidate.clone());

        match &winner {
            Some(candidate) => info!("Selected {}", candidate),
            None => warn!("No candidate qualified"),
        }
        if cancelled {
            warn!("Selection cancelled; ranking reflects partial measurements");
        }

        Ok(SelectionResult {
            winner,
            ranking,
            cancelled,
        })
    }
}

/// Primary plan of the first `count` targets; reduced plan on `reliable_url`
/// or, without one, the first target
fn plan_for<'a>(
    target_urls: &'a [String],
    reliable_url: Option<&'a str>,
    count: usize,
) -> Result<MeasurementPlan<'a>, ConfigError> {
    let Some(first_target) = target_urls.first() else {
        return Err(ConfigError::NoTargetUrls);
    };
    let primary = &target_urls[..count.min(target_urls.len())];
    Ok(MeasurementPlan::new(primary, reliable_url.unwrap_or(first_target.as_str())))
}

/// One-shot helper around [`Selector`]
pub async fn select(
    candidates: &[ProxyCandidate],
    target_urls: &[String],
    reliable_url: Option<&str>,
    config: SelectionConfig,
    transport: Arc<dyn ProbeTransport>,
    cancel: CancellationToken,
) -> Result<SelectionResult, ConfigError> {
    Selector::new(transport, config, cancel)
        .select(candidates, target_urls, reliable_url)
        .await
}
