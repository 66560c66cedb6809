//! Proxy ranker
//!
//! Measures a list of forwarding-proxy candidates with repeated timed HTTP
//! probes, derives robust latency statistics, disqualifies unreliable
//! candidates and ranks the rest by a weighted composite score.
//!
//! The pipeline is [`measure`] → [`stats`] → [`evaluate`], driven by
//! [`selector::Selector`]. [`source`] and [`channel`] connect it to the
//! proxy list it reads and the API channels it updates.

pub mod args;
pub mod channel;
pub mod config;
pub mod constants;
pub mod evaluate;
pub mod logging;
pub mod measure;
pub mod probe;
pub mod selector;
pub mod source;
pub mod stats;
pub mod types;

pub use config::{AppConfig, ConfigError, SelectionConfig, load_config, load_config_with_fallback};
pub use evaluate::{Disqualification, Evaluator, ScoreReport, rank};
pub use measure::{MeasurementOrchestrator, MeasurementPlan};
pub use probe::{HttpProbeTransport, ProbeFailure, ProbeTransport, Sampler};
pub use selector::{SelectionResult, Selector, select};
pub use stats::StatReport;
pub use types::{MeasurementSet, ProxyCandidate, ProxyCredential, Sample};
