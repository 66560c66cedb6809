//! Validated string types that enforce invariants at construction time

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation errors for string and numeric newtypes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("hostname cannot be empty or whitespace")]
    EmptyHostName,

    #[error("invalid hostname: {0}")]
    InvalidHostName(String),

    #[error("proxy username cannot be empty or whitespace")]
    EmptyUsername,

    #[error("port cannot be 0")]
    InvalidPort,

    #[error("invalid endpoint '{0}': expected host:port")]
    InvalidEndpoint(String),
}

/// Generates a validated `String` newtype.
///
/// Each type gets a validating `new()`, `as_str()`, `AsRef<str>`, `Deref`,
/// `Display`, `TryFrom<String>` and serde support that re-runs validation
/// on deserialization.
macro_rules! validated_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident(String) {
            validation: |$s_param:ident| $validation:expr,
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        $vis struct $name(String);

        impl $name {
            #[doc = concat!("Create a new ", stringify!($name), " after validation")]
            pub fn new($s_param: String) -> Result<Self, ValidationError> {
                let validate = || $validation;
                validate()?;
                Ok(Self($s_param))
            }

            #[doc = concat!("Get the ", stringify!($name), " as a string slice")]
            #[must_use]
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from($s_param: String) -> Result<Self, Self::Error> {
                Self::new($s_param)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

validated_string! {
    /// A proxy hostname or IP address
    ///
    /// Must be non-empty and must not contain whitespace, a scheme separator
    /// or a port; the port lives in its own [`Port`](super::Port) field.
    ///
    /// # Examples
    /// ```
    /// use proxy_ranker::types::HostName;
    ///
    /// let host = HostName::new("203.0.113.7".to_string()).unwrap();
    /// assert_eq!(host.as_str(), "203.0.113.7");
    ///
    /// assert!(HostName::new("   ".to_string()).is_err());
    /// assert!(HostName::new("10.0.0.1:8080".to_string()).is_err());
    /// ```
    #[doc(alias = "host")]
    pub struct HostName(String) {
        validation: |s| {
            if s.trim().is_empty() {
                Err(ValidationError::EmptyHostName)
            } else if s.chars().any(|c| c.is_whitespace() || c == '/' || c == '@')
                || (s.contains(':') && !s.starts_with('['))
            {
                Err(ValidationError::InvalidHostName(s.clone()))
            } else {
                Ok(())
            }
        },
    }
}

validated_string! {
    /// Username used for proxy basic authentication
    pub struct Username(String) {
        validation: |s| {
            if s.trim().is_empty() {
                Err(ValidationError::EmptyUsername)
            } else {
                Ok(())
            }
        },
    }
}
