//! Error handling for nrphp.
//!
//! Provides the crate-wide error type using thiserror. Library code returns
//! these typed errors; the CLI boundary wraps them with anyhow context.

use thiserror::Error;

/// Main error type for nrphp
#[derive(Error, Debug)]
pub enum AgentError {
    /// IO errors (config file reads/writes, probe reads)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration validation errors (missing required field, bad value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Plan consistency errors (broken dependency edges, duplicate ids)
    #[error("Plan error: {0}")]
    Plan(String),
}

/// Result type alias for nrphp operations
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a plan consistency error
    pub fn plan(msg: impl Into<String>) -> Self {
        Self::Plan(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::validation("license_key must be specified");
        assert_eq!(
            err.to_string(),
            "Validation error: license_key must be specified"
        );

        let err = AgentError::plan("duplicate assertion id");
        assert_eq!(err.to_string(), "Plan error: duplicate assertion id");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AgentError = io_err.into();
        assert!(matches!(err, AgentError::Io(_)));
    }
}
