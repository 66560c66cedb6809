//! Statistics engine
//!
//! Pure, stateless computation from a sample sequence to a [`StatReport`].
//! Latency statistics use successful samples only; availability statistics
//! use every attempt. Every field is `None` when its inputs are missing, so
//! "no data" never masquerades as "zero latency".

pub mod percentile;

use serde::Serialize;

use crate::config::SelectionConfig;
use crate::constants::scoring::{MAD_TO_SIGMA, QOS_WEIGHTS, TRIM_FRACTION};
use crate::types::{Sample, successful_latencies};
use percentile::{
    mean, median_absolute_deviation, percentile, population_std_dev, sorted, trimmed_mean,
};

/// Central tendency and order statistics (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BasicStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
}

/// Spread of successful latencies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VariabilityStats {
    /// Population standard deviation
    pub std_dev: Option<f64>,
    /// `std_dev / mean`; 0 with no spread, `None` for a zero mean with spread
    pub coefficient_of_variation: Option<f64>,
    pub interquartile_range: Option<f64>,
    pub median_absolute_deviation: Option<f64>,
    /// `1.4826 * MAD`
    pub robust_std_dev: Option<f64>,
}

/// Outlier-resistant summaries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RobustnessStats {
    pub outlier_ratio: Option<f64>,
    /// Mean after trimming 10% from each end
    pub trimmed_mean: Option<f64>,
    /// `1 - cv / consistency_window`, clamped to [0, 1]
    pub consistency_score: Option<f64>,
    /// `1 - outlier_ratio`
    pub stability_index: Option<f64>,
}

/// Scenario metrics for API traffic through the proxy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ApiPerformanceStats {
    /// Fraction of successful samples above the spike threshold
    pub spike_rate: Option<f64>,
    /// `min(1, spike_rate + outlier_ratio)`
    pub timeout_risk_score: Option<f64>,
    /// Successful attempts over all attempts
    pub availability_stability: Option<f64>,
    pub qos_score: Option<f64>,
    /// `consistency_score * availability_stability`
    pub sustained_performance_score: Option<f64>,
}

/// Everything the evaluator needs to know about one candidate's samples
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatReport {
    pub success_count: usize,
    pub attempt_count: usize,
    pub basic: BasicStats,
    pub variability: VariabilityStats,
    pub robustness: RobustnessStats,
    pub api_performance: ApiPerformanceStats,
}

impl StatReport {
    /// Compute every statistic for `samples` under `config`'s thresholds
    #[must_use]
    pub fn compute(samples: &[Sample], config: &SelectionConfig) -> Self {
        let latencies = successful_latencies(samples);
        let ordered = sorted(&latencies);

        let basic = basic_stats(&ordered);
        let variability = variability_stats(&ordered, &basic);
        let robustness = robustness_stats(&ordered, &basic, &variability, config);
        let api_performance = api_performance_stats(
            &ordered,
            samples.len(),
            &basic,
            &robustness,
            config,
        );

        Self {
            success_count: latencies.len(),
            attempt_count: samples.len(),
            basic,
            variability,
            robustness,
            api_performance,
        }
    }

    /// Successful over attempted samples; `None` with no attempts
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        ratio(self.success_count, self.attempt_count)
    }
}

fn ratio(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}

fn basic_stats(ordered: &[f64]) -> BasicStats {
    BasicStats {
        mean: mean(ordered),
        median: percentile(ordered, 0.5),
        min: ordered.first().copied(),
        max: ordered.last().copied(),
        p25: percentile(ordered, 0.25),
        p75: percentile(ordered, 0.75),
        p95: percentile(ordered, 0.95),
        p99: percentile(ordered, 0.99),
    }
}

fn variability_stats(ordered: &[f64], basic: &BasicStats) -> VariabilityStats {
    let std_dev = basic
        .mean
        .and_then(|m| population_std_dev(ordered, m));
    let coefficient_of_variation = match (std_dev, basic.mean) {
        (Some(sd), Some(_)) if sd == 0.0 => Some(0.0),
        (Some(sd), Some(m)) if m != 0.0 => Some(sd / m),
        _ => None,
    };
    let mad = basic
        .median
        .and_then(|median| median_absolute_deviation(ordered, median));

    VariabilityStats {
        std_dev,
        coefficient_of_variation,
        interquartile_range: basic.p75.zip(basic.p25).map(|(p75, p25)| p75 - p25),
        median_absolute_deviation: mad,
        robust_std_dev: mad.map(|m| MAD_TO_SIGMA * m),
    }
}

fn robustness_stats(
    ordered: &[f64],
    basic: &BasicStats,
    variability: &VariabilityStats,
    config: &SelectionConfig,
) -> RobustnessStats {
    let outlier_ratio = basic
        .mean
        .zip(variability.std_dev)
        .map(|(m, sd)| {
            let limit = config.outlier_threshold_sigma * sd;
            let outliers = ordered.iter().filter(|x| (*x - m).abs() > limit).count();
            outliers as f64 / ordered.len() as f64
        });

    RobustnessStats {
        outlier_ratio,
        trimmed_mean: trimmed_mean(ordered, TRIM_FRACTION),
        consistency_score: variability
            .coefficient_of_variation
            .map(|cv| (1.0 - cv / config.consistency_window).clamp(0.0, 1.0)),
        stability_index: outlier_ratio.map(|r| (1.0 - r).clamp(0.0, 1.0)),
    }
}

fn api_performance_stats(
    ordered: &[f64],
    attempts: usize,
    basic: &BasicStats,
    robustness: &RobustnessStats,
    config: &SelectionConfig,
) -> ApiPerformanceStats {
    let spike_rate = (!ordered.is_empty()).then(|| {
        let spikes = ordered
            .iter()
            .filter(|x| **x > config.spike_threshold_ms)
            .count();
        spikes as f64 / ordered.len() as f64
    });
    let timeout_risk_score = spike_rate
        .zip(robustness.outlier_ratio)
        .map(|(spikes, outliers)| (spikes + outliers).min(1.0));
    let availability_stability = ratio(ordered.len(), attempts);

    let qos_score = match (basic.p95, robustness.stability_index, availability_stability) {
        (Some(p95), Some(stability), Some(availability)) => {
            let normalized_p95 = (p95 / config.max_latency_ms).min(1.0);
            Some(
                QOS_WEIGHTS[0] * (1.0 - normalized_p95)
                    + QOS_WEIGHTS[1] * stability
                    + QOS_WEIGHTS[2] * availability,
            )
        }
        _ => None,
    };

    ApiPerformanceStats {
        spike_rate,
        timeout_risk_score,
        availability_stability,
        qos_score,
        sustained_performance_score: robustness
            .consistency_score
            .zip(availability_stability)
            .map(|(consistency, availability)| consistency * availability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeFailure;
    use std::time::SystemTime;

    const EPS: f64 = 1e-9;

    fn samples(latencies: &[f64], failures: usize) -> Vec<Sample> {
        let now = SystemTime::now();
        latencies
            .iter()
            .map(|l| Sample::success("http://t.test/", *l, now))
            .chain(
                (0..failures)
                    .map(|_| Sample::failure("http://t.test/", ProbeFailure::Timeout, now)),
            )
            .collect()
    }

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|a| (a - expected).abs() < EPS)
    }

    #[test]
    fn test_empty_sequence_is_all_absent() {
        let report = StatReport::compute(&[], &SelectionConfig::default());
        assert_eq!(report.basic, BasicStats::default());
        assert_eq!(report.variability, VariabilityStats::default());
        assert_eq!(report.robustness, RobustnessStats::default());
        assert_eq!(report.api_performance, ApiPerformanceStats::default());
        assert_eq!(report.success_rate(), None);
    }

    #[test]
    fn test_only_failures_keeps_availability() {
        let report = StatReport::compute(&samples(&[], 4), &SelectionConfig::default());
        assert_eq!(report.basic.mean, None);
        assert_eq!(report.basic.p95, None);
        assert_eq!(report.variability.std_dev, None);
        assert_eq!(report.api_performance.availability_stability, Some(0.0));
        assert_eq!(report.api_performance.timeout_risk_score, None);
        assert_eq!(report.success_rate(), Some(0.0));
    }

    #[test]
    fn test_identical_latencies() {
        for v in [0.0, 80.0] {
            let report = StatReport::compute(&samples(&[v; 6], 0), &SelectionConfig::default());
            assert_eq!(report.basic.mean, Some(v));
            assert_eq!(report.basic.median, Some(v));
            assert_eq!(report.basic.p95, Some(v));
            assert_eq!(report.basic.p99, Some(v));
            assert_eq!(report.variability.std_dev, Some(0.0));
            assert_eq!(report.variability.coefficient_of_variation, Some(0.0));
            assert_eq!(report.robustness.outlier_ratio, Some(0.0));
            assert_eq!(report.robustness.consistency_score, Some(1.0));
            assert_eq!(report.robustness.stability_index, Some(1.0));
        }
    }

    #[test]
    fn test_spike_example() {
        let report = StatReport::compute(
            &samples(&[100.0, 100.0, 100.0, 100.0, 900.0], 0),
            &SelectionConfig::default(),
        );

        assert!(close(report.basic.mean, 260.0));
        assert!(close(report.basic.p95, 740.0));
        assert!(close(report.variability.std_dev, 320.0));
        // 900 sits 2 sigma from the mean, past the 1.5 sigma threshold
        assert!(close(report.robustness.outlier_ratio, 0.2));
        assert!(close(report.robustness.stability_index, 0.8));
        assert!(close(report.variability.interquartile_range, 0.0));
        assert!(close(report.variability.median_absolute_deviation, 0.0));
        assert!(close(report.variability.robust_std_dev, 0.0));
    }

    #[test]
    fn test_zero_latency_is_perfectly_consistent() {
        let report = StatReport::compute(&samples(&[0.0, 0.0], 1), &SelectionConfig::default());
        assert_eq!(report.basic.mean, Some(0.0));
        assert_eq!(report.variability.coefficient_of_variation, Some(0.0));
        assert_eq!(report.robustness.consistency_score, Some(1.0));
        assert!(close(report.api_performance.sustained_performance_score, 2.0 / 3.0));
    }

    #[test]
    fn test_consistency_clamped_at_zero() {
        // cv = 0.8 > consistency window 0.5
        let report = StatReport::compute(&samples(&[20.0, 180.0], 0), &SelectionConfig::default());
        assert!(close(report.variability.coefficient_of_variation, 0.8));
        assert_eq!(report.robustness.consistency_score, Some(0.0));
    }

    #[test]
    fn test_api_performance_blend() {
        // 3 successes at 300ms, 1 at 2000ms (> 1500 spike threshold), 1 failure
        let report = StatReport::compute(
            &samples(&[300.0, 300.0, 300.0, 2000.0], 1),
            &SelectionConfig::default(),
        );
        let api = report.api_performance;
        assert!(close(api.spike_rate, 0.25));
        assert!(close(api.availability_stability, 0.8));

        let outliers = report.robustness.outlier_ratio.unwrap();
        assert!(close(api.timeout_risk_score, (0.25 + outliers).min(1.0)));

        let p95 = report.basic.p95.unwrap();
        let expected_qos = 0.5 * (1.0 - (p95 / 3000.0).min(1.0))
            + 0.3 * report.robustness.stability_index.unwrap()
            + 0.2 * 0.8;
        assert!(close(api.qos_score, expected_qos));
    }

    #[test]
    fn test_timeout_risk_bounded() {
        let config = SelectionConfig::new(crate::config::SelectionSettings {
            spike_threshold_ms: 1.0,
            ..Default::default()
        })
        .unwrap();
        let report = StatReport::compute(&samples(&[10.0, 10.0, 10.0, 10.0, 500.0], 0), &config);
        assert_eq!(report.api_performance.spike_rate, Some(1.0));
        assert_eq!(report.api_performance.timeout_risk_score, Some(1.0));
    }

    #[test]
    fn test_failures_excluded_from_latency_math() {
        let config = SelectionConfig::default();
        let with_failures = StatReport::compute(&samples(&[50.0, 70.0], 3), &config);
        let without = StatReport::compute(&samples(&[50.0, 70.0], 0), &config);
        assert_eq!(with_failures.basic, without.basic);
        assert_eq!(with_failures.variability, without.variability);
        assert_eq!(with_failures.success_count, 2);
        assert_eq!(with_failures.attempt_count, 5);
    }
}
