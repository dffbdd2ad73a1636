//! Refinement Loop: critique a generated instruction, then rewrite it with
//! the critique applied.
//!
//! The two steps are never chained automatically; the caller decides whether
//! to apply a critique.

use crate::prompts::PromptRenderer;
use forge_core::agent::{ContentAgent, GenerateRequest};
use forge_core::config::ModelConfig;
use forge_core::{ForgeError, Result};
use std::sync::Arc;

pub const NO_IMPROVEMENTS: &str = "No improvements found.";
pub const CRITIQUE_UNAVAILABLE: &str = "Could not fetch suggestions.";

/// Improvement suggestions for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Critique {
    pub text: String,
    /// True when `text` is a placeholder rather than real suggestions.
    pub degraded: bool,
}

impl Critique {
    fn placeholder(text: &str) -> Self {
        Self {
            text: text.to_string(),
            degraded: true,
        }
    }
}

pub struct RefinementService {
    agent: Arc<dyn ContentAgent>,
    renderer: PromptRenderer,
    critique_model: String,
    refinement_model: String,
}

impl RefinementService {
    pub fn new(agent: Arc<dyn ContentAgent>, models: &ModelConfig) -> Self {
        Self {
            agent,
            renderer: PromptRenderer::new(),
            critique_model: models.critique.clone(),
            refinement_model: models.refinement.clone(),
        }
    }

    /// Asks for a short bulleted list of improvements.
    ///
    /// Best-effort: never fails. A backend failure yields the
    /// [`CRITIQUE_UNAVAILABLE`] placeholder, an empty answer yields
    /// [`NO_IMPROVEMENTS`].
    pub async fn critique(&self, document: &str) -> Critique {
        let prompt = match self.renderer.critique(document) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("[Refinement] {}", e);
                return Critique::placeholder(CRITIQUE_UNAVAILABLE);
            }
        };

        match self
            .agent
            .generate(GenerateRequest::text(&self.critique_model, prompt))
            .await
        {
            Ok(text) if text.trim().is_empty() => Critique::placeholder(NO_IMPROVEMENTS),
            Ok(text) => Critique {
                text: text.trim().to_string(),
                degraded: false,
            },
            Err(e) => {
                tracing::warn!("[Refinement] Critique failed: {}", e);
                Critique::placeholder(CRITIQUE_UNAVAILABLE)
            }
        }
    }

    /// Rewrites `document` so that it incorporates `critique`.
    ///
    /// # Errors
    ///
    /// * `Validation` if `critique` is blank (no request is sent)
    /// * `Refinement` if the backend fails or answers with an empty body
    pub async fn refine(&self, document: &str, critique: &str) -> Result<String> {
        if critique.trim().is_empty() {
            return Err(ForgeError::validation(
                "No critique to apply; request suggestions first",
            ));
        }

        let prompt = self.renderer.refine(document, critique)?;
        tracing::info!(
            "[Refinement] Applying critique via {} ({})",
            self.agent.name(),
            self.refinement_model
        );

        let refined = self
            .agent
            .generate(GenerateRequest::text(&self.refinement_model, prompt))
            .await
            .map_err(|e| e.into_forge_error(ForgeError::Refinement))?;

        let refined = refined.trim();
        if refined.is_empty() {
            return Err(ForgeError::refinement("Backend returned an empty document"));
        }
        Ok(refined.to_string())
    }
}
