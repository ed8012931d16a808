//! Runtime error types for the Febris inference pipeline.
//!
//! All fallible operations in the pipeline return `FebrisResult<T>`.
//! Variants carry enough context for the transport layer to build a useful
//! error response without inspecting log output.

use thiserror::Error;

/// The unified error type for the Febris pipeline.
#[derive(Debug, Error)]
pub enum FebrisError {
    /// The model artifact is missing, failed to load, or is internally
    /// inconsistent. Permanent for the lifetime of the process.
    #[error("model artifact unavailable: {reason}")]
    ArtifactUnavailable { reason: String },

    /// A patient field could not be coerced to the type it requires.
    #[error("invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A feature lookup failed while assembling the classifier row.
    ///
    /// Should never happen once the artifact has passed its load-time checks.
    #[error("missing field '{field}' during feature assembly")]
    MissingField { field: String },

    /// The classifier itself failed or produced an unusable distribution.
    #[error("inference failed: {reason}")]
    InferenceFailure { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl FebrisError {
    /// The HTTP status code the transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ArtifactUnavailable { .. } => 503,
            Self::InvalidInput { .. } => 400,
            Self::MissingField { .. } | Self::InferenceFailure { .. } | Self::ConfigError { .. } => {
                500
            }
        }
    }

    /// Shorthand for building an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the Febris crates.
pub type FebrisResult<T> = Result<T, FebrisError>;
