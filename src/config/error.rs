//! Configuration errors
//!
//! Every variant is fatal and raised before any measurement starts.

use thiserror::Error;

use crate::types::ValidationError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("scoring weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("weight '{name}' must be within [0, 1], got {value}")]
    WeightRange { name: &'static str, value: f64 },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("at least one target URL is required")]
    NoTargetUrls,

    #[error("invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for environment variable {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
