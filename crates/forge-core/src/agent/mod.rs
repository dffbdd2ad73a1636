//! Backend port for the generative-AI service.
//!
//! The application layer talks to the backend exclusively through
//! [`ContentAgent`]; `forge-interaction` provides the Gemini REST
//! implementation and tests provide in-memory fakes.

use crate::error::ForgeError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// One piece of request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Raw bytes; transports encode them as they need (e.g. base64).
    InlineData { mime_type: String, data: Vec<u8> },
}

/// Shape the caller expects back.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// JSON constrained to the given schema.
    Json { schema: Value },
}

/// A single "generate content" call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<Part>,
    pub response_format: ResponseFormat,
    /// Let the backend ground its answer with web search.
    pub search_grounding: bool,
    pub thinking_budget: Option<u32>,
}

impl GenerateRequest {
    /// Creates a plain-text request with a single text part.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: vec![Part::Text(prompt.into())],
            response_format: ResponseFormat::Text,
            search_grounding: false,
            thinking_budget: None,
        }
    }

    /// Creates a request from an explicit part list.
    pub fn with_parts(model: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            parts,
            ..Self::text(model, String::new())
        }
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_format = ResponseFormat::Json { schema };
        self
    }

    pub fn search_grounding(mut self) -> Self {
        self.search_grounding = true;
        self
    }

    pub fn thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    pub fn expects_json(&self) -> bool {
        matches!(self.response_format, ResponseFormat::Json { .. })
    }

    /// Concatenation of all text parts, mostly useful for diagnostics.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Transport-level failure reported by a [`ContentAgent`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("{message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("{0}")]
    ExecutionFailed(String),

    /// Credential missing or unusable
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Maps this failure into the domain error of the calling operation.
    ///
    /// Configuration problems stay configuration errors regardless of the
    /// operation; everything else is wrapped with `kind`.
    pub fn into_forge_error(self, kind: fn(String) -> ForgeError) -> ForgeError {
        match self {
            Self::Configuration(message) => ForgeError::Config(message),
            other => kind(other.to_string()),
        }
    }
}

/// A remote "generate content" procedure.
#[async_trait]
pub trait ContentAgent: Send + Sync {
    /// Short provider name used in log lines.
    fn name(&self) -> &str;

    /// Issues one request and returns the response body text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, AgentError>;
}
