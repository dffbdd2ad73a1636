//! Remote Analysis Adapter
//!
//! Infers a partial project configuration from a URL, an uploaded file or a
//! free-form hint. All branches ask the backend for JSON constrained to
//! [`AnalysisResult::response_schema`]; the caller merges the result.

use crate::prompts::PromptRenderer;
use forge_core::agent::{ContentAgent, GenerateRequest, Part};
use forge_core::config::ModelConfig;
use forge_core::project::AnalysisResult;
use forge_core::{ForgeError, Result};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file handed over by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type; guessed from `name` when absent.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Reads a file from disk, keeping only its file name.
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ForgeError::validation(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Declared MIME type, else a guess from the file name.
    pub fn effective_mime_type(&self) -> String {
        self.mime_type
            .as_deref()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .map(str::to_string)
            .or_else(|| {
                mime_guess::from_path(&self.name)
                    .first_raw()
                    .map(str::to_string)
            })
            .unwrap_or_else(|| FALLBACK_MIME.to_string())
    }

    /// JSON and XML files are analyzed as text; everything else as media.
    pub fn is_structured_text(&self) -> bool {
        let lower = self.name.to_ascii_lowercase();
        if lower.ends_with(".json") || lower.ends_with(".xml") {
            return true;
        }
        let mime = self.effective_mime_type();
        mime.contains("json") || mime.contains("xml")
    }
}

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    Url(String),
    File(UploadedFile),
    Hint(String),
}

impl AnalysisSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::File(file) if file.is_structured_text() => "file",
            Self::File(_) => "media",
            Self::Hint(_) => "hint",
        }
    }
}

/// Parses `raw` as an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ForgeError::validation(format!("Invalid URL '{trimmed}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(ForgeError::validation(format!(
            "Invalid URL '{trimmed}': expected an absolute http(s) address"
        )));
    }
    Ok(url)
}

pub struct AnalysisService {
    agent: Arc<dyn ContentAgent>,
    renderer: PromptRenderer,
    analysis_model: String,
    media_model: String,
}

impl AnalysisService {
    pub fn new(agent: Arc<dyn ContentAgent>, models: &ModelConfig) -> Self {
        Self {
            agent,
            renderer: PromptRenderer::new(),
            analysis_model: models.analysis.clone(),
            media_model: models.media.clone(),
        }
    }

    /// Analyzes `source`, optionally steered by `context`.
    ///
    /// # Errors
    ///
    /// * `Validation` for a malformed URL or a blank hint (no request is sent)
    /// * `Analysis` for backend failures and unusable responses
    /// * `Config` if the backend has no usable credential
    pub async fn analyze(
        &self,
        source: &AnalysisSource,
        context: Option<&str>,
    ) -> Result<AnalysisResult> {
        let request = self.build_request(source, context)?;
        tracing::info!(
            "[Analysis] Analyzing {} source via {} ({})",
            source.kind(),
            self.agent.name(),
            request.model
        );

        let body = self
            .agent
            .generate(request)
            .await
            .map_err(|e| e.into_forge_error(ForgeError::Analysis))?;

        if body.trim().is_empty() {
            return Err(ForgeError::analysis("No response from analysis"));
        }

        let result = AnalysisResult::from_json(&body)
            .map_err(|e| ForgeError::analysis(format!("Malformed analysis response: {e}")))?;
        if result.is_empty() {
            tracing::warn!("[Analysis] Backend returned no usable fields");
        }
        Ok(result)
    }

    pub async fn analyze_url(&self, url: &str, context: Option<&str>) -> Result<AnalysisResult> {
        self.analyze(&AnalysisSource::Url(url.to_string()), context)
            .await
    }

    /// Builds the backend request for `source` without sending it.
    pub fn build_request(
        &self,
        source: &AnalysisSource,
        context: Option<&str>,
    ) -> Result<GenerateRequest> {
        let request = match source {
            AnalysisSource::Url(raw) => {
                let url = validate_url(raw)?;
                let prompt = self.renderer.url_analysis(url.as_str(), context)?;
                GenerateRequest::text(&self.analysis_model, prompt).search_grounding()
            }
            AnalysisSource::File(file) if file.is_structured_text() => {
                let prompt = self.renderer.file_analysis(&file.name, context)?;
                let content = String::from_utf8_lossy(&file.bytes);
                GenerateRequest::with_parts(
                    &self.analysis_model,
                    vec![
                        Part::Text(prompt),
                        Part::Text(format!(
                            "FILE CONTENT START:\n{content}\nFILE CONTENT END"
                        )),
                    ],
                )
            }
            AnalysisSource::File(file) => {
                if file.bytes.is_empty() {
                    return Err(ForgeError::validation(format!(
                        "Uploaded file '{}' is empty",
                        file.name
                    )));
                }
                let prompt = self.renderer.media_analysis(context)?;
                GenerateRequest::with_parts(
                    &self.media_model,
                    vec![
                        Part::InlineData {
                            mime_type: file.effective_mime_type(),
                            data: file.bytes.clone(),
                        },
                        Part::Text(prompt),
                    ],
                )
            }
            AnalysisSource::Hint(hint) => {
                let hint = hint.trim();
                if hint.is_empty() {
                    return Err(ForgeError::validation("Describe the project to analyze"));
                }
                let prompt = self.renderer.hint_analysis(hint, context)?;
                GenerateRequest::text(&self.analysis_model, prompt)
            }
        };

        Ok(request.json_schema(AnalysisResult::response_schema()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forge_core::agent::{AgentError, ResponseFormat};

    struct Unreachable;

    #[async_trait]
    impl ContentAgent for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn generate(
            &self,
            _request: GenerateRequest,
        ) -> std::result::Result<String, AgentError> {
            Err(AgentError::Other("should not be called".into()))
        }
    }

    fn service() -> AnalysisService {
        AnalysisService::new(Arc::new(Unreachable), &ModelConfig::default())
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com/acme/shop").is_ok());
        assert!(validate_url("  http://example.com/path?q=1 ").is_ok());
        assert!(validate_url("not a url").unwrap_err().is_validation());
        assert!(validate_url("github.com/acme").unwrap_err().is_validation());
        assert!(validate_url("mailto:dev@example.com").unwrap_err().is_validation());
        assert!(validate_url("").unwrap_err().is_validation());
    }

    #[test]
    fn test_structured_text_detection() {
        assert!(UploadedFile::new("package.json", vec![]).is_structured_text());
        assert!(UploadedFile::new("repomix-output.XML", vec![]).is_structured_text());
        assert!(
            UploadedFile::new("dump", vec![])
                .with_mime_type("application/json")
                .is_structured_text()
        );
        assert!(!UploadedFile::new("screen.png", vec![]).is_structured_text());
        assert!(!UploadedFile::new("demo.mp4", vec![]).is_structured_text());
        assert!(!UploadedFile::new("notes.txt", vec![]).is_structured_text());
    }

    #[test]
    fn test_mime_type_fallbacks() {
        assert_eq!(
            UploadedFile::new("screen.png", vec![]).effective_mime_type(),
            "image/png"
        );
        assert_eq!(
            UploadedFile::new("blob", vec![]).effective_mime_type(),
            FALLBACK_MIME
        );
        assert_eq!(
            UploadedFile::new("screen.png", vec![])
                .with_mime_type("image/webp")
                .effective_mime_type(),
            "image/webp"
        );
    }

    #[test]
    fn test_url_request_uses_grounding_and_schema() {
        let request = service()
            .build_request(&AnalysisSource::Url("https://github.com/acme/shop".into()), None)
            .unwrap();
        assert!(request.search_grounding);
        assert_eq!(request.model, ModelConfig::default().analysis);
        assert_eq!(
            request.response_format,
            ResponseFormat::Json {
                schema: AnalysisResult::response_schema()
            }
        );
    }

    #[test]
    fn test_text_file_request_carries_content() {
        let file = UploadedFile::new("package.json", br#"{"name":"shop"}"#.to_vec());
        let request = service()
            .build_request(&AnalysisSource::File(file), None)
            .unwrap();
        assert!(!request.search_grounding);
        assert_eq!(request.parts.len(), 2);
        assert!(request.text_content().contains(r#"{"name":"shop"}"#));
        assert!(request.text_content().contains("Filename: \"package.json\""));
    }

    #[test]
    fn test_media_request_puts_binary_first() {
        let file = UploadedFile::new("screen.png", vec![0x89, 0x50]);
        let request = service()
            .build_request(&AnalysisSource::File(file), Some("admin panel"))
            .unwrap();
        assert_eq!(request.model, ModelConfig::default().media);
        assert!(matches!(
            &request.parts[0],
            Part::InlineData { mime_type, data }
                if mime_type == "image/png" && data.as_slice() == [0x89u8, 0x50]
        ));
        assert!(request.text_content().contains("admin panel"));
        assert!(request.expects_json());
    }

    #[test]
    fn test_blank_inputs_are_validation_errors() {
        let svc = service();
        assert!(
            svc.build_request(&AnalysisSource::Hint("  ".into()), None)
                .unwrap_err()
                .is_validation()
        );
        assert!(
            svc.build_request(
                &AnalysisSource::File(UploadedFile::new("shot.png", vec![])),
                None
            )
            .unwrap_err()
            .is_validation()
        );
    }
}
