//! Core data model: candidates, samples and validated newtypes

pub mod candidate;
pub mod duration;
pub mod limits;
pub mod port;
pub mod sample;
pub mod validated;

pub use candidate::{ProxyCandidate, ProxyCredential};
pub use duration::duration_ms_serde;
pub use limits::MaxCandidates;
pub use port::Port;
pub use sample::{MeasurementSet, Sample, successful_latencies};
pub use validated::{HostName, Username, ValidationError};
