//! Candidate evaluation and ranking
//!
//! Turns a [`StatReport`] into a [`ScoreReport`]: a hard gate first, then a
//! composite score in [0, 1] for candidates that pass. Missing statistics
//! always contribute the worst-case value instead of being skipped.

mod ranking;

pub use ranking::{compare_qualified, rank};

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::config::SelectionConfig;
use crate::constants::scoring::{
    AVAILABILITY_WEIGHTS, PERFORMANCE_WEIGHTS, STABILITY_WEIGHTS, TIMEOUT_RISK_LIMIT,
};
use crate::stats::StatReport;
use crate::types::{MeasurementSet, ProxyCandidate};

/// First hard-gate rule a candidate violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disqualification {
    /// Fewer successful samples than the full-statistics minimum, even after degradation
    InsufficientSamples,
    LowSuccessRate,
    HighLatency,
    TimeoutRisk,
}

impl Disqualification {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientSamples => "insufficient-samples",
            Self::LowSuccessRate => "low-success-rate",
            Self::HighLatency => "high-latency",
            Self::TimeoutRisk => "timeout-risk",
        }
    }
}

impl fmt::Display for Disqualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three blended sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SubScores {
    pub performance: f64,
    pub stability: f64,
    pub availability: f64,
}

/// Evaluation result for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub candidate: ProxyCandidate,
    pub stats: StatReport,
    /// Composite in [0, 1]; 0 for disqualified candidates
    pub composite_score: f64,
    /// Sub-scores; `None` for disqualified candidates
    pub sub_scores: Option<SubScores>,
    pub qualifies: bool,
    pub reason: Option<Disqualification>,
    /// Measured under the fallback plan or cut short by cancellation
    pub degraded: bool,
}

/// Applies the gate and the scoring formula under one configuration
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    config: &'a SelectionConfig,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub const fn new(config: &'a SelectionConfig) -> Self {
        Self { config }
    }

    /// Compute statistics for `measurement` and score them
    #[must_use]
    pub fn evaluate(&self, measurement: &MeasurementSet) -> ScoreReport {
        let stats = StatReport::compute(&measurement.samples, self.config);
        let mut report = self.score(measurement.candidate.clone(), stats);
        report.degraded = measurement.degraded;
        report
    }

    /// Gate and score an already-computed report
    #[must_use]
    pub fn score(&self, candidate: ProxyCandidate, stats: StatReport) -> ScoreReport {
        match self.gate(&stats) {
            Ok(()) => {
                let sub_scores = self.sub_scores(&stats);
                let composite_score = self.composite(&sub_scores);
                debug!(
                    "Candidate {} qualifies: score {:.4} (perf {:.3}, stab {:.3}, avail {:.3})",
                    candidate,
                    composite_score,
                    sub_scores.performance,
                    sub_scores.stability,
                    sub_scores.availability
                );
                ScoreReport {
                    candidate,
                    stats,
                    composite_score,
                    sub_scores: Some(sub_scores),
                    qualifies: true,
                    reason: None,
                    degraded: false,
                }
            }
            Err(reason) => {
                debug!("Candidate {} disqualified: {}", candidate, reason);
                ScoreReport {
                    candidate,
                    stats,
                    composite_score: 0.0,
                    sub_scores: None,
                    qualifies: false,
                    reason: Some(reason),
                    degraded: false,
                }
            }
        }
    }

    /// Hard gate; returns the first violated rule
    pub fn gate(&self, stats: &StatReport) -> Result<(), Disqualification> {
        if stats.success_count == 0 || stats.success_count < self.config.min_samples_full_stats {
            return Err(Disqualification::InsufficientSamples);
        }
        if stats.success_rate().unwrap_or(0.0) < self.config.min_success_rate {
            return Err(Disqualification::LowSuccessRate);
        }
        if stats.basic.mean.unwrap_or(f64::INFINITY) > self.config.max_latency_ms {
            return Err(Disqualification::HighLatency);
        }
        if stats.api_performance.timeout_risk_score.unwrap_or(1.0) >= TIMEOUT_RISK_LIMIT {
            return Err(Disqualification::TimeoutRisk);
        }
        Ok(())
    }

    /// Performance, stability and availability sub-scores
    ///
    /// Absent inputs score their worst case (0 for the term).
    #[must_use]
    pub fn sub_scores(&self, stats: &StatReport) -> SubScores {
        let latency_score = |value: Option<f64>| {
            value.map_or(0.0, |v| unit(1.0 - (v / self.config.max_latency_ms).min(1.0)))
        };
        let inverse = |value: Option<f64>| value.map_or(0.0, |v| unit(1.0 - v));
        let direct = |value: Option<f64>| value.map_or(0.0, unit);

        let basic = &stats.basic;
        let performance = blend(
            PERFORMANCE_WEIGHTS,
            [
                latency_score(basic.mean),
                latency_score(basic.p95),
                latency_score(basic.median),
            ],
        );

        let stability = blend(
            STABILITY_WEIGHTS,
            [
                inverse(stats.variability.coefficient_of_variation),
                direct(stats.robustness.consistency_score),
                inverse(stats.robustness.outlier_ratio),
            ],
        );

        let availability = blend(
            AVAILABILITY_WEIGHTS,
            [
                direct(stats.success_rate()),
                direct(stats.api_performance.availability_stability),
                inverse(stats.api_performance.timeout_risk_score),
            ],
        );

        SubScores {
            performance,
            stability,
            availability,
        }
    }

    /// Weighted composite of the sub-scores, clamped to [0, 1]
    #[must_use]
    pub fn composite(&self, sub_scores: &SubScores) -> f64 {
        let weights = &self.config.weights;
        unit(
            weights.performance * sub_scores.performance
                + weights.stability * sub_scores.stability
                + weights.availability * sub_scores.availability,
        )
    }
}

#[inline]
fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[inline]
fn blend(weights: [f64; 3], terms: [f64; 3]) -> f64 {
    unit(
        weights
            .iter()
            .zip(terms)
            .map(|(w, t)| w * t)
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoreWeights, SelectionSettings};
    use crate::stats::{ApiPerformanceStats, BasicStats, RobustnessStats, VariabilityStats};

    fn candidate() -> ProxyCandidate {
        ProxyCandidate::from_ipv4_endpoint("192.0.2.10:8080", None).unwrap()
    }

    /// Stats for `successes` of `attempts` probes all at `latency` ms
    fn flat_stats(latency: f64, successes: usize, attempts: usize) -> StatReport {
        let availability = successes as f64 / attempts as f64;
        StatReport {
            success_count: successes,
            attempt_count: attempts,
            basic: BasicStats {
                mean: Some(latency),
                median: Some(latency),
                min: Some(latency),
                max: Some(latency),
                p25: Some(latency),
                p75: Some(latency),
                p95: Some(latency),
                p99: Some(latency),
            },
            variability: VariabilityStats {
                std_dev: Some(0.0),
                coefficient_of_variation: Some(0.0),
                interquartile_range: Some(0.0),
                median_absolute_deviation: Some(0.0),
                robust_std_dev: Some(0.0),
            },
            robustness: RobustnessStats {
                outlier_ratio: Some(0.0),
                trimmed_mean: Some(latency),
                consistency_score: Some(1.0),
                stability_index: Some(1.0),
            },
            api_performance: ApiPerformanceStats {
                spike_rate: Some(0.0),
                timeout_risk_score: Some(0.0),
                availability_stability: Some(availability),
                qos_score: None,
                sustained_performance_score: Some(availability),
            },
        }
    }

    #[test]
    fn test_perfect_candidate_scores_one() {
        use crate::types::Sample;
        use std::time::SystemTime;

        let config = SelectionConfig::new(SelectionSettings {
            weights: ScoreWeights {
                performance: 0.4,
                stability: 0.35,
                availability: 0.25,
            },
            ..Default::default()
        })
        .unwrap();
        let now = SystemTime::now();
        let set = MeasurementSet::new(
            candidate(),
            (0..9).map(|_| Sample::success("http://t.test/", 0.0, now)).collect(),
        );

        let report = Evaluator::new(&config).evaluate(&set);

        assert!(report.qualifies);
        assert!((report.composite_score - 1.0).abs() < 1e-12);
        let subs = report.sub_scores.unwrap();
        assert!((subs.performance - 1.0).abs() < 1e-12);
        assert!((subs.stability - 1.0).abs() < 1e-12);
        assert!((subs.availability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_successes_disqualified() {
        let config = SelectionConfig::default();
        let stats = StatReport {
            attempt_count: 9,
            ..Default::default()
        };
        let report = Evaluator::new(&config).score(candidate(), stats);
        assert!(!report.qualifies);
        assert_eq!(report.reason, Some(Disqualification::InsufficientSamples));
        assert_eq!(report.composite_score, 0.0);
        assert!(report.sub_scores.is_none());
    }

    #[test]
    fn test_too_few_successes_disqualified() {
        let config = SelectionConfig::default();
        let report = Evaluator::new(&config).score(candidate(), flat_stats(50.0, 2, 2));
        assert_eq!(report.reason, Some(Disqualification::InsufficientSamples));
    }

    #[test]
    fn test_low_success_rate_disqualified_despite_low_latency() {
        let config = SelectionConfig::default();
        let report = Evaluator::new(&config).score(candidate(), flat_stats(1.0, 4, 10));
        assert!(!report.qualifies);
        assert_eq!(report.reason, Some(Disqualification::LowSuccessRate));
    }

    #[test]
    fn test_high_latency_disqualified() {
        let config = SelectionConfig::default();
        let report = Evaluator::new(&config).score(candidate(), flat_stats(3500.0, 9, 9));
        assert_eq!(report.reason, Some(Disqualification::HighLatency));
    }

    #[test]
    fn test_timeout_risk_disqualified_at_limit() {
        let config = SelectionConfig::default();
        let mut stats = flat_stats(200.0, 9, 9);
        stats.api_performance.timeout_risk_score = Some(0.2);
        let report = Evaluator::new(&config).score(candidate(), stats);
        assert_eq!(report.reason, Some(Disqualification::TimeoutRisk));

        stats.api_performance.timeout_risk_score = Some(0.19);
        assert!(Evaluator::new(&config).score(candidate(), stats).qualifies);
    }

    #[test]
    fn test_absent_metric_scores_worst_case() {
        let config = SelectionConfig::default();
        let evaluator = Evaluator::new(&config);
        let full = flat_stats(100.0, 9, 9);
        let mut missing_cv = full;
        missing_cv.variability.coefficient_of_variation = None;
        missing_cv.robustness.consistency_score = None;

        let full_stab = evaluator.sub_scores(&full).stability;
        let missing_stab = evaluator.sub_scores(&missing_cv).stability;
        assert!((full_stab - 1.0).abs() < 1e-12);
        // only the (1 - outlier_ratio) term remains
        assert!((missing_stab - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_latency_normalization_saturates() {
        let config = SelectionConfig::default();
        let evaluator = Evaluator::new(&config);
        let subs = evaluator.sub_scores(&flat_stats(1_500.0, 9, 9));
        assert!((subs.performance - 0.5).abs() < 1e-12);
        let subs = evaluator.sub_scores(&flat_stats(9_000.0, 9, 9));
        assert_eq!(subs.performance, 0.0);
    }

    #[test]
    fn test_evaluate_carries_degraded_flag() {
        use crate::types::Sample;
        use std::time::SystemTime;

        let config = SelectionConfig::default();
        let now = SystemTime::now();
        let mut set = MeasurementSet::new(
            candidate(),
            (0..3).map(|_| Sample::success("http://t.test/", 120.0, now)).collect(),
        );
        set.degraded = true;

        let report = Evaluator::new(&config).evaluate(&set);
        assert!(report.degraded);
        assert!(report.qualifies);
        assert_eq!(report.stats.success_count, 3);
    }

    #[test]
    fn test_disqualification_strings() {
        assert_eq!(
            Disqualification::InsufficientSamples.to_string(),
            "insufficient-samples"
        );
        assert_eq!(
            serde_json::to_string(&Disqualification::LowSuccessRate).unwrap(),
            "\"low-success-rate\""
        );
    }
}
