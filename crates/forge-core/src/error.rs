//! Error types for PromptForge.

use thiserror::Error;

/// A shared error type for every PromptForge layer.
///
/// Backend failures are classified by the operation that issued them
/// (`Analysis`, `Generation`, `Refinement`), so callers can surface a
/// precise notice while keeping their prior state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    /// Bad user input, detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote analysis failed or returned unusable data
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Instruction generation failed or returned an empty document
    #[error("Generation error: {0}")]
    Generation(String),

    /// Applying a critique to the current document failed
    #[error("Refinement error: {0}")]
    Refinement(String),

    /// Missing credential or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForgeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Analysis error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Refinement error
    pub fn refinement(message: impl Into<String>) -> Self {
        Self::Refinement(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an analysis error
    pub fn is_analysis(&self) -> bool {
        matches!(self, Self::Analysis(_))
    }

    /// Check if this is a generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this is a refinement error
    pub fn is_refinement(&self) -> bool {
        matches!(self, Self::Refinement(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ForgeError>`.
pub type Result<T> = std::result::Result<T, ForgeError>;
