//! Constants used throughout the proxy ranker
//!
//! Defaults for configurable values live here so `config::defaults` and the
//! tests agree on one source. Fixed scoring coefficients live in `scoring`.

/// Selection pipeline defaults
pub mod selection {
    /// Probes per target URL in the primary plan
    pub const SAMPLES_PER_URL: usize = 3;

    /// Target URLs used by the primary plan
    pub const TARGET_URL_COUNT: usize = 3;

    /// Per-probe timeout (matches the 10s request timeout of the updater)
    pub const PROBE_TIMEOUT_MS: u64 = 10_000;

    /// Concurrent probes per candidate
    pub const PROBE_CONCURRENCY: usize = 8;

    /// Candidates measured at the same time
    pub const CANDIDATE_CONCURRENCY: usize = 2;

    /// Hard ceiling on in-flight probes across all candidates
    pub const MAX_IN_FLIGHT_PROBES: usize = 32;

    /// Distance from the mean, in standard deviations, beyond which a sample is an outlier
    ///
    /// With n samples no point can sit further than (n-1)/sqrt(n) sigma from
    /// the mean, so thresholds above ~1.8 never fire on five-sample runs.
    pub const OUTLIER_THRESHOLD_SIGMA: f64 = 1.5;

    /// Latency above which a successful probe counts as a spike
    pub const SPIKE_THRESHOLD_MS: f64 = 1_500.0;

    /// Coefficient of variation at which the consistency score reaches zero
    pub const CONSISTENCY_WINDOW: f64 = 0.5;

    /// Successful samples required before the degradation plan is skipped
    pub const MIN_SAMPLES_FULL_STATS: usize = 3;

    /// Minimum fraction of successful probes for a candidate to qualify
    pub const MIN_SUCCESS_RATE: f64 = 0.6;

    /// Mean latency ceiling; also the normalization scale for latency scores
    pub const MAX_LATENCY_MS: f64 = 3_000.0;

    pub const WEIGHT_PERFORMANCE: f64 = 0.4;
    pub const WEIGHT_STABILITY: f64 = 0.35;
    pub const WEIGHT_AVAILABILITY: f64 = 0.25;

    /// Tolerance when checking that the weights sum to 1
    pub const WEIGHT_EPSILON: f64 = 1e-6;
}

/// Fixed coefficients of the statistics and scoring formulas
pub mod scoring {
    /// Scales MAD to a standard-deviation estimate under normality
    pub const MAD_TO_SIGMA: f64 = 1.4826;

    /// Fraction trimmed from each end for the trimmed mean
    pub const TRIM_FRACTION: f64 = 0.1;

    /// Candidates at or above this timeout-risk score are disqualified
    pub const TIMEOUT_RISK_LIMIT: f64 = 0.2;

    /// QoS blend: (1 - normalized P95), stability index, availability stability
    pub const QOS_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

    /// Performance blend: mean, P95, median
    pub const PERFORMANCE_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

    /// Stability blend: (1 - CV), consistency, (1 - outlier ratio)
    pub const STABILITY_WEIGHTS: [f64; 3] = [0.4, 0.35, 0.25];

    /// Availability blend: success rate, availability stability, (1 - timeout risk)
    pub const AVAILABILITY_WEIGHTS: [f64; 3] = [0.6, 0.25, 0.15];

    const fn sums_to_one(w: [f64; 3]) -> bool {
        (w[0] + w[1] + w[2] - 1.0).abs() < 1e-12
    }

    const _BLENDS_NORMALIZED: () = assert!(
        sums_to_one(QOS_WEIGHTS)
            && sums_to_one(PERFORMANCE_WEIGHTS)
            && sums_to_one(STABILITY_WEIGHTS)
            && sums_to_one(AVAILABILITY_WEIGHTS),
        "every score blend must sum to 1"
    );
}

/// HTTP probing
pub mod probe {
    /// Default probe target; answers 200 with the caller's visible address
    pub const DEFAULT_TARGET_URLS: [&str; 3] = [
        "http://ip.im/info",
        "http://www.gstatic.com/generate_204",
        "http://cp.cloudflare.com/generate_204",
    ];

    /// Browser-like user agent; some proxies drop requests without one
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
}

/// Candidate list source
pub mod source {
    /// Markdown table of free proxies, refreshed hourly upstream
    pub const PROXY_LIST_URL: &str =
        "https://raw.githubusercontent.com/TopChina/proxy-list/refs/heads/main/README.md";

    /// Region column value to select
    pub const DEFAULT_REGION: &str = "香港";

    /// Password shared by every account in the list
    pub const DEFAULT_PASSWORD: &str = "1";

    /// Candidates taken from the head of the list per run
    pub const MAX_CANDIDATES: usize = 5;

    pub const FETCH_TIMEOUT_MS: u64 = 30_000;
}

/// Channel update API
pub mod channel {
    /// Path appended to the base URL for channel updates
    pub const API_PATH: &str = "/api/channel/";

    /// Header carrying the admin user id
    pub const ADMIN_USER_HEADER: &str = "New-Api-User";

    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
}
