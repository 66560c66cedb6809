//! Configuration validation
//!
//! Rejects bad values up front so that no measurement ever runs with weights
//! that do not sum to 1, zero sample counts or zero timeouts.

use super::ConfigError;
use super::types::{AppConfig, ProbeConfig, ScoreWeights, SelectionConfig, SelectionSettings};
use crate::constants::selection::WEIGHT_EPSILON;

impl SelectionSettings {
    /// Check every field; the first violation wins
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_count("samples_per_url", self.samples_per_url)?;
        positive_count("target_url_count", self.target_url_count)?;
        positive_count("probe_concurrency", self.probe_concurrency)?;
        positive_count("candidate_concurrency", self.candidate_concurrency)?;
        positive_count("max_in_flight_probes", self.max_in_flight_probes)?;
        positive_count("min_samples_full_stats", self.min_samples_full_stats)?;

        if self.probe_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                field: "probe_timeout_ms",
            });
        }

        positive_finite("outlier_threshold_sigma", self.outlier_threshold_sigma)?;
        positive_finite("spike_threshold_ms", self.spike_threshold_ms)?;
        positive_finite("consistency_window", self.consistency_window)?;
        positive_finite("max_latency_ms", self.max_latency_ms)?;

        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(ConfigError::OutOfRange {
                field: "min_success_rate",
                value: self.min_success_rate,
                min: 0.0,
                max: 1.0,
            });
        }

        self.weights.validate()
    }
}

impl ScoreWeights {
    /// Each weight within [0, 1] and the three summing to 1 within epsilon
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("performance", self.performance),
            ("stability", self.stability),
            ("availability", self.availability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_urls.is_empty() {
            return Err(ConfigError::NoTargetUrls);
        }
        self.target_urls
            .iter()
            .map(String::as_str)
            .chain(self.reliable_url.as_deref())
            .try_for_each(validate_http_url)
    }
}

impl AppConfig {
    /// Validate every section and return the frozen selection parameters
    pub fn validate(&self) -> Result<SelectionConfig, ConfigError> {
        self.probe.validate()?;
        if let Some(base_url) = self.channel.base_url.as_deref()
            && !base_url.trim().is_empty()
        {
            validate_http_url(base_url)?;
        }
        SelectionConfig::new(self.selection.clone())
    }
}

/// Accept only absolute `http`/`https` URLs
pub fn validate_http_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

fn positive_count(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::NonPositive { field })
    } else {
        Ok(())
    }
}

fn positive_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> SelectionSettings {
        SelectionSettings::default()
    }

    #[test]
    fn test_defaults_valid() {
        assert!(settings().validate().is_ok());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let s = SelectionSettings {
            weights: ScoreWeights {
                performance: 0.5,
                stability: 0.3,
                availability: 0.3,
            },
            ..settings()
        };
        let err = s.validate().unwrap_err();
        assert!(matches!(err, ConfigError::WeightSum { .. }), "{err}");
    }

    #[test]
    fn test_weights_within_epsilon_accepted() {
        let s = SelectionSettings {
            weights: ScoreWeights {
                performance: 0.4,
                stability: 0.35,
                availability: 0.25 + 1e-9,
            },
            ..settings()
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let s = SelectionSettings {
            weights: ScoreWeights {
                performance: 1.2,
                stability: -0.2,
                availability: 0.0,
            },
            ..settings()
        };
        assert!(matches!(
            s.validate(),
            Err(ConfigError::WeightRange {
                name: "performance",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_counts_rejected() {
        let cases: [(&str, SelectionSettings); 3] = [
            (
                "samples_per_url",
                SelectionSettings {
                    samples_per_url: 0,
                    ..settings()
                },
            ),
            (
                "probe_concurrency",
                SelectionSettings {
                    probe_concurrency: 0,
                    ..settings()
                },
            ),
            (
                "probe_timeout_ms",
                SelectionSettings {
                    probe_timeout: Duration::ZERO,
                    ..settings()
                },
            ),
        ];
        for (expected, s) in cases {
            match s.validate() {
                Err(ConfigError::NonPositive { field }) => assert_eq!(field, expected),
                other => panic!("expected NonPositive for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let s = SelectionSettings {
            max_latency_ms: f64::NAN,
            ..settings()
        };
        assert!(matches!(
            s.validate(),
            Err(ConfigError::NonPositive {
                field: "max_latency_ms"
            })
        ));
    }

    #[test]
    fn test_success_rate_range() {
        let s = SelectionSettings {
            min_success_rate: 1.5,
            ..settings()
        };
        assert!(matches!(
            s.validate(),
            Err(ConfigError::OutOfRange {
                field: "min_success_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_targets_rejected() {
        let probe = ProbeConfig {
            target_urls: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(probe.validate(), Err(ConfigError::NoTargetUrls)));
    }

    #[test]
    fn test_bad_target_url_rejected() {
        let probe = ProbeConfig {
            target_urls: vec!["ftp://files.test/".into()],
            ..Default::default()
        };
        assert!(matches!(
            probe.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let probe = ProbeConfig {
            target_urls: vec!["not a url".into()],
            ..Default::default()
        };
        assert!(probe.validate().is_err());
    }
}
