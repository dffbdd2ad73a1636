//! Instruction Synthesizer
//!
//! Turns a [`ProjectConfig`] into a single generation request and returns the
//! markdown system instruction produced by the backend.

use crate::prompts::PromptRenderer;
use forge_core::agent::{ContentAgent, GenerateRequest};
use forge_core::config::ModelConfig;
use forge_core::project::ProjectConfig;
use forge_core::{ForgeError, Result};
use std::sync::Arc;

pub struct InstructionSynthesizer {
    agent: Arc<dyn ContentAgent>,
    renderer: PromptRenderer,
    model: String,
    thinking_budget: u32,
}

impl InstructionSynthesizer {
    pub fn new(agent: Arc<dyn ContentAgent>, models: &ModelConfig) -> Self {
        Self {
            agent,
            renderer: PromptRenderer::new(),
            model: models.generation.clone(),
            thinking_budget: models.thinking_budget,
        }
    }

    /// Renders the prompt without calling the backend.
    pub fn build_prompt(&self, config: &ProjectConfig) -> Result<String> {
        self.renderer.generation(config)
    }

    /// Generates the system instruction for `config`.
    ///
    /// # Errors
    ///
    /// * `Validation` if the description is blank (no request is sent)
    /// * `Generation` if the backend fails or answers with an empty body
    /// * `Config` if the backend has no usable credential
    pub async fn generate(&self, config: &ProjectConfig) -> Result<String> {
        if !config.can_submit() {
            return Err(ForgeError::validation(
                "A project description is required before generating",
            ));
        }

        let prompt = self.build_prompt(config)?;
        let mut request = GenerateRequest::text(&self.model, prompt);
        if self.thinking_budget > 0 {
            request = request.thinking_budget(self.thinking_budget);
        }

        tracing::info!(
            "[Synthesizer] Generating instruction for '{}' via {} ({})",
            config.name,
            self.agent.name(),
            self.model
        );

        let document = self
            .agent
            .generate(request)
            .await
            .map_err(|e| e.into_forge_error(ForgeError::Generation))?;

        let document = document.trim();
        if document.is_empty() {
            return Err(ForgeError::generation("Backend returned an empty document"));
        }

        tracing::debug!("[Synthesizer] Received {} chars", document.len());
        Ok(document.to_string())
    }
}
