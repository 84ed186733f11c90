//! Error types for the call coordinator

use thiserror::Error;

/// Main error type for call coordinator operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Capability not available: {capability}")]
    CapabilityUnavailable { capability: String },

    #[error("{capability} does not support {operation}")]
    Unsupported {
        capability: String,
        operation: String,
    },

    #[error("{capability} failed: {reason}")]
    Native { capability: String, reason: String },
}

impl Error {
    /// Shorthand for a failure reported by a native capability
    pub fn native(capability: &str, reason: impl Into<String>) -> Self {
        Error::Native {
            capability: capability.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an operation the capability does not implement
    pub fn unsupported(capability: &str, operation: &str) -> Self {
        Error::Unsupported {
            capability: capability.to_string(),
            operation: operation.to_string(),
        }
    }

    /// True for the expected "not on this platform/build" class of errors
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Error::CapabilityUnavailable { .. } | Error::Unsupported { .. }
        )
    }
}

/// Result type alias for call coordinator operations
pub type Result<T> = std::result::Result<T, Error>;
