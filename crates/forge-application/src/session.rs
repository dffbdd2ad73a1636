//! The session context object.
//!
//! A [`ForgeSession`] owns everything a single user session mutates: the
//! project configuration, the current document, the pending critique, the
//! status console and the single progress timer. It is created at session
//! start and torn down with [`ForgeSession::shutdown`]; nothing is persisted.

use crate::analysis_service::{AnalysisService, AnalysisSource, validate_url};
use crate::refinement_service::{Critique, RefinementService};
use crate::synthesizer::InstructionSynthesizer;
use forge_core::agent::ContentAgent;
use forge_core::config::ForgeConfig;
use forge_core::project::{AnalysisResult, ProjectConfig, find_template, join_stacks};
use forge_core::{ForgeError, Result};
use forge_execution::{
    ConsoleLog, ProgressReporter, ProgressSlot, SUCCESS_STEPS, simulation_steps,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct ForgeSession {
    id: String,
    config: ProjectConfig,
    document: Option<String>,
    pending_critique: Option<String>,
    console: ConsoleLog,
    progress: ProgressSlot,
    reporter: ProgressReporter,
    settle_delay: Duration,
    analysis: AnalysisService,
    synthesizer: InstructionSynthesizer,
    refinement: RefinementService,
}

impl ForgeSession {
    /// Starts a session with the default project configuration.
    pub fn new(agent: Arc<dyn ContentAgent>, settings: &ForgeConfig) -> Self {
        let id = Uuid::new_v4().to_string();
        tracing::debug!("[Session] Created session {}", id);

        Self {
            id,
            config: ProjectConfig::new(),
            document: None,
            pending_critique: None,
            console: ConsoleLog::new(),
            progress: ProgressSlot::new(),
            reporter: ProgressReporter::from_config(&settings.progress),
            settle_delay: settings.progress.settle_delay(),
            analysis: AnalysisService::new(agent.clone(), &settings.models),
            synthesizer: InstructionSynthesizer::new(agent.clone(), &settings.models),
            refinement: RefinementService::new(agent, &settings.models),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn pending_critique(&self) -> Option<&str> {
        self.pending_critique.as_deref()
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn is_progress_active(&self) -> bool {
        self.progress.is_active()
    }

    pub fn synthesizer(&self) -> &InstructionSynthesizer {
        &self.synthesizer
    }

    /// Applies the built-in template called `name` (case-insensitive).
    pub fn apply_template(&mut self, name: &str) -> Result<()> {
        let template = find_template(name)
            .ok_or_else(|| ForgeError::validation(format!("Unknown template '{name}'")))?;
        self.config.apply_template(&template);
        tracing::debug!("[Session] Applied template '{}'", template.name);
        Ok(())
    }

    /// Analyzes `source` and merges the result into the configuration.
    ///
    /// On failure the configuration is left untouched and an `[ERR]` line is
    /// written to the console. Malformed URLs are rejected before anything is
    /// logged or sent.
    pub async fn analyze(
        &mut self,
        source: AnalysisSource,
        context: Option<&str>,
    ) -> Result<AnalysisResult> {
        match &source {
            AnalysisSource::Url(raw) => {
                validate_url(raw)?;
                self.console
                    .push(format!("[INFO] Analyzing external resource: {}", raw.trim()));
                self.console.push("[NET] Initiating search grounding...");
            }
            AnalysisSource::File(file) => {
                self.console
                    .push(format!("[INFO] Analyzing uploaded file: {}", file.name));
            }
            AnalysisSource::Hint(_) => {
                self.console.push("[INFO] Analyzing project hint...");
            }
        }

        match self.analysis.analyze(&source, context).await {
            Ok(result) => {
                self.console.push("[SUCCESS] Analysis complete.");
                if let Some(name) = &result.name {
                    self.console.push(format!("[DATA] Detected Name: {name}"));
                }
                if let Some(stacks) = &result.selected_stacks {
                    self.console
                        .push(format!("[DATA] Detected Stack: {}", join_stacks(stacks)));
                }
                self.config.merge_analysis(result.clone());
                Ok(result)
            }
            Err(e) => {
                self.console.push(format!("[ERR] Analysis failed: {e}"));
                tracing::warn!("[Session] Analysis failed: {}", e);
                Err(e)
            }
        }
    }

    /// Generates a new document from the current configuration.
    ///
    /// Starts the progress timer (cancelling any previous one), waits for the
    /// backend, then stops the timer on both paths. On failure the previous
    /// document is kept.
    pub async fn generate(&mut self) -> Result<&str> {
        if !self.config.can_submit() {
            return Err(ForgeError::validation(
                "A project description is required before generating",
            ));
        }

        self.console.clear();
        let handle = self
            .reporter
            .start(simulation_steps(&self.config), self.console.clone());
        self.progress.replace(handle);

        match self.synthesizer.generate(&self.config).await {
            Ok(document) => {
                for line in SUCCESS_STEPS {
                    self.console.push(line);
                }
                tokio::time::sleep(self.settle_delay).await;
                self.progress.stop();

                self.pending_critique = None;
                Ok(self.document.insert(document).as_str())
            }
            Err(e) => {
                self.console.push(format!("[ERR] Generation failed: {e}"));
                self.progress.stop();
                Err(e)
            }
        }
    }

    /// Fetches improvement suggestions for the current document.
    ///
    /// A degraded (placeholder) critique is returned but not held, so it can
    /// never be applied.
    pub async fn critique(&mut self) -> Result<Critique> {
        let document = self.document.as_deref().ok_or_else(|| {
            ForgeError::validation("Generate an instruction before requesting suggestions")
        })?;

        let critique = self.refinement.critique(document).await;
        self.pending_critique = (!critique.degraded).then(|| critique.text.clone());
        Ok(critique)
    }

    /// Rewrites the current document with the held critique.
    ///
    /// Rejected without a backend call when no critique is held. On failure
    /// both the document and the critique are kept.
    pub async fn apply_critique(&mut self) -> Result<&str> {
        let critique = self
            .pending_critique
            .as_deref()
            .filter(|critique| !critique.trim().is_empty())
            .ok_or_else(|| ForgeError::validation("No suggestions to apply"))?;
        let document = self
            .document
            .as_deref()
            .ok_or_else(|| ForgeError::validation("No instruction to refine"))?;

        let refined = self.refinement.refine(document, critique).await?;
        self.pending_critique = None;
        Ok(self.document.insert(refined).as_str())
    }

    /// Tears the session down, stopping the progress timer if one is running.
    pub fn shutdown(&mut self) {
        if self.progress.stop() {
            tracing::debug!("[Session] Stopped progress timer on shutdown");
        }
    }
}

impl Drop for ForgeSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
