//! Duration serialization helpers for configuration files
//!
//! Timeouts are written as integer milliseconds (`probe_timeout_ms = 2500`)
//! so sub-second values stay expressible in TOML.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub mod duration_ms_serde {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
