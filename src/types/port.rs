//! Non-zero port number

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;

use super::ValidationError;

/// A network port that cannot be zero
///
/// Port 0 means "any port" to the OS and can never address a proxy, so it is
/// rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(NonZeroU16);

impl Port {
    /// Create a new Port, returning None if `port` is 0
    #[must_use]
    pub const fn new(port: u16) -> Option<Self> {
        match NonZeroU16::new(port) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Get the port number as u16
    #[must_use]
    #[inline]
    pub const fn get(&self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<u16> for Port {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ValidationError::InvalidPort)
    }
}

impl std::str::FromStr for Port {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidEndpoint(s.to_string()))?;
        Self::try_from(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.get()
    }
}

impl Serialize for Port {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.get())
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Self::new(port).ok_or_else(|| serde::de::Error::custom("port cannot be 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_zero_rejected() {
        assert!(Port::new(0).is_none());
        assert_eq!(Port::try_from(0), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn test_port_from_str() {
        assert_eq!("3128".parse::<Port>().unwrap().get(), 3128);
        assert!("0".parse::<Port>().is_err());
        assert!("70000".parse::<Port>().is_err());
        assert!("http".parse::<Port>().is_err());
    }

    #[test]
    fn test_port_serde() {
        let port = Port::new(8080).unwrap();
        let json = serde_json::to_string(&port).unwrap();
        assert_eq!(json, "8080");
        let back: Port = serde_json::from_str(&json).unwrap();
        assert_eq!(back, port);
        assert!(serde_json::from_str::<Port>("0").is_err());
    }
}
