//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::ConfigError;
use super::defaults;
use crate::constants::selection;
use crate::types::{MaxCandidates, duration_ms_serde};

/// Top-level weights blending the three sub-scores into the composite score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub performance: f64,
    pub stability: f64,
    pub availability: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            performance: selection::WEIGHT_PERFORMANCE,
            stability: selection::WEIGHT_STABILITY,
            availability: selection::WEIGHT_AVAILABILITY,
        }
    }
}

impl ScoreWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.performance + self.stability + self.availability
    }
}

/// Raw measurement and scoring parameters as written in the config file
///
/// Unvalidated; turn it into a [`SelectionConfig`] before use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionSettings {
    /// Probes per target URL
    pub samples_per_url: usize,
    /// How many of the configured target URLs the primary plan uses
    pub target_url_count: usize,
    #[serde(rename = "probe_timeout_ms", with = "duration_ms_serde")]
    pub probe_timeout: Duration,
    /// Concurrent probes per candidate
    pub probe_concurrency: usize,
    /// Candidates measured at the same time
    pub candidate_concurrency: usize,
    /// Hard ceiling on in-flight probes across all candidates
    pub max_in_flight_probes: usize,
    pub outlier_threshold_sigma: f64,
    pub spike_threshold_ms: f64,
    /// Coefficient of variation at which consistency reaches zero
    pub consistency_window: f64,
    /// Successful samples needed to skip the degradation plan
    pub min_samples_full_stats: usize,
    pub min_success_rate: f64,
    /// Mean-latency ceiling and normalization scale for latency scores
    pub max_latency_ms: f64,
    pub weights: ScoreWeights,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            samples_per_url: selection::SAMPLES_PER_URL,
            target_url_count: selection::TARGET_URL_COUNT,
            probe_timeout: defaults::probe_timeout(),
            probe_concurrency: selection::PROBE_CONCURRENCY,
            candidate_concurrency: selection::CANDIDATE_CONCURRENCY,
            max_in_flight_probes: selection::MAX_IN_FLIGHT_PROBES,
            outlier_threshold_sigma: selection::OUTLIER_THRESHOLD_SIGMA,
            spike_threshold_ms: selection::SPIKE_THRESHOLD_MS,
            consistency_window: selection::CONSISTENCY_WINDOW,
            min_samples_full_stats: selection::MIN_SAMPLES_FULL_STATS,
            min_success_rate: selection::MIN_SUCCESS_RATE,
            max_latency_ms: selection::MAX_LATENCY_MS,
            weights: ScoreWeights::default(),
        }
    }
}

/// Validated, read-only selection parameters
///
/// Only obtainable through [`SelectionConfig::new`], so holding one proves
/// the weights sum to 1 and every count, bound and timeout is positive.
/// Fields are read through `Deref` to [`SelectionSettings`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionConfig {
    settings: SelectionSettings,
}

impl SelectionConfig {
    /// Validate `settings` and freeze them
    pub fn new(settings: SelectionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[must_use]
    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    /// Permits for the probe semaphore shared by every candidate
    ///
    /// Product of the two concurrency bounds, capped at the in-flight ceiling.
    #[must_use]
    pub fn effective_probe_permits(&self) -> usize {
        self.settings
            .probe_concurrency
            .saturating_mul(self.settings.candidate_concurrency)
            .min(self.settings.max_in_flight_probes)
    }
}

impl std::ops::Deref for SelectionConfig {
    type Target = SelectionSettings;

    fn deref(&self) -> &Self::Target {
        &self.settings
    }
}

impl TryFrom<SelectionSettings> for SelectionConfig {
    type Error = ConfigError;

    fn try_from(settings: SelectionSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

/// HTTP probe settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// Target URLs probed through each candidate, in priority order
    #[serde(default = "defaults::target_urls")]
    pub target_urls: Vec<String>,
    /// URL used by the degradation plan; defaults to the first target URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliable_url: Option<String>,
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
    #[serde(default = "defaults::accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_urls: defaults::target_urls(),
            reliable_url: None,
            user_agent: defaults::user_agent(),
            accept_invalid_certs: defaults::accept_invalid_certs(),
        }
    }
}

/// Candidate list source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "defaults::source_url")]
    pub url: String,
    /// Value of the region column to keep
    #[serde(default = "defaults::region")]
    pub region: String,
    #[serde(default = "defaults::max_candidates")]
    pub max_candidates: MaxCandidates,
    /// Password paired with every username in the list
    #[serde(default = "defaults::default_password")]
    pub default_password: String,
    #[serde(
        rename = "fetch_timeout_ms",
        with = "duration_ms_serde",
        default = "defaults::fetch_timeout"
    )]
    pub fetch_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            region: defaults::region(),
            max_candidates: defaults::max_candidates(),
            default_password: defaults::default_password(),
            fetch_timeout: defaults::fetch_timeout(),
        }
    }
}

/// Channel API receiving the selected proxy
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    #[serde(default)]
    pub channel_ids: Vec<i64>,
    #[serde(
        rename = "request_timeout_ms",
        with = "duration_ms_serde",
        default = "defaults::channel_request_timeout"
    )]
    pub request_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            admin_id: None,
            admin_token: None,
            channel_ids: Vec::new(),
            request_timeout: defaults::channel_request_timeout(),
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("base_url", &self.base_url)
            .field("admin_id", &self.admin_id)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("channel_ids", &self.channel_ids)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ChannelConfig {
    /// Environment variable names of the settings still missing
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.base_url) {
            missing.push("BASE_URL");
        }
        if blank(&self.admin_id) {
            missing.push("ADMIN_ID");
        }
        if blank(&self.admin_token) {
            missing.push("ADMIN_TOKEN");
        }
        if self.channel_ids.is_empty() {
            missing.push("CHANNEL_IDS");
        }
        missing
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Periodic run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScheduleConfig {
    /// Seconds between runs; absent or 0 runs once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

impl ScheduleConfig {
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}
