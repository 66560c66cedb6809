//! Configuration module
//!
//! Raw serde shapes, their defaults, loading from TOML and the environment,
//! and validation into the immutable [`SelectionConfig`] every pipeline
//! stage reads.

mod defaults;
mod error;
mod loading;
mod types;
mod validation;

pub use error::ConfigError;
pub use loading::{
    ConfigSource, ENV_KEYS, load_config, load_config_with_fallback, parse_config,
};
pub use types::{
    AppConfig, ChannelConfig, ProbeConfig, ScheduleConfig, ScoreWeights, SelectionConfig,
    SelectionSettings, SourceConfig,
};
pub use validation::validate_http_url;
