//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Translates a [`GenerateRequest`] into a `generateContent` call, including
//! inline binary parts (base64), JSON-constrained output and the
//! `google_search` grounding tool.

use crate::config::resolve_api_key;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use forge_core::agent::{AgentError, ContentAgent, GenerateRequest, Part, ResponseFormat};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Agent implementation that talks to the Gemini HTTP API.
///
/// The API key is optional at construction time; a missing key surfaces as
/// [`AgentError::Configuration`] on the first request.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Creates an agent whose credential is resolved from the environment
    /// or `secret.json`. Never fails; see [`GeminiApiAgent::has_credentials`].
    pub fn from_env() -> Self {
        let api_key = resolve_api_key();
        if api_key.is_none() {
            tracing::warn!("[Gemini] No API key configured; requests will fail");
        }
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    fn api_key(&self) -> Result<&str, AgentError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AgentError::Configuration(
                    "Gemini API key not found. Set GEMINI_API_KEY or add it to \
                     ~/.config/promptforge/secret.json"
                        .into(),
                )
            })
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, AgentError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| AgentError::ProcessError {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Other(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ContentAgent for GeminiApiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, AgentError> {
        let body = build_request_body(&request)?;
        tracing::debug!(
            "[Gemini] generateContent model={} parts={} json={} grounding={}",
            request.model,
            body.contents[0].parts.len(),
            request.expects_json(),
            request.search_grounding
        );
        self.send_request(&request.model, &body).await
    }
}

fn build_request_body(request: &GenerateRequest) -> Result<GenerateContentRequest, AgentError> {
    let parts: Vec<PartPayload> = request
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Text(text) if text.trim().is_empty() => None,
            Part::Text(text) => Some(PartPayload::Text { text: text.clone() }),
            Part::InlineData { mime_type, data } => Some(PartPayload::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: mime_type.clone(),
                    data: BASE64_STANDARD.encode(data),
                },
            }),
        })
        .collect();

    if parts.is_empty() {
        return Err(AgentError::ExecutionFailed(
            "Gemini payload must include text or inline data".into(),
        ));
    }

    let (response_mime_type, response_schema) = match &request.response_format {
        ResponseFormat::Text => (None, None),
        ResponseFormat::Json { schema } => {
            (Some("application/json".to_string()), Some(schema.clone()))
        }
    };
    let thinking_config = request
        .thinking_budget
        .filter(|budget| *budget > 0)
        .map(|thinking_budget| ThinkingConfig { thinking_budget });

    let generation_config = GenerationConfig {
        response_mime_type,
        response_schema,
        thinking_config,
    };

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        tools: if request.search_grounding {
            vec![Tool::default()]
        } else {
            Vec::new()
        },
        generation_config: (!generation_config.is_empty()).then_some(generation_config),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<PartPayload>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PartPayload {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
struct Tool {
    #[serde(rename = "google_search")]
    google_search: GoogleSearchConfig,
}

#[derive(Serialize, Default)]
struct GoogleSearchConfig {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.response_mime_type.is_none()
            && self.response_schema.is_none()
            && self.thinking_config.is_none()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Joins the non-thought text parts of the first candidate; an answer
/// without text yields an empty string.
fn extract_text_response(response: GenerateContentResponse) -> Result<String, AgentError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AgentError::ExecutionFailed(format!(
            "Gemini blocked the prompt: {reason}"
        )));
    }

    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        tracing::debug!("[Gemini] Response carried no text");
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AgentError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return AgentError::Configuration(format!(
            "Gemini rejected the API key ({}): {message}",
            status.as_u16()
        ));
    }

    AgentError::ProcessError {
        status_code: Some(status.as_u16()),
        message,
        is_retryable: is_retryable_status(status),
        retry_after,
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
