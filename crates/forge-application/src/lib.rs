//! Use cases of PromptForge: project analysis, instruction synthesis, the
//! critique/refine loop and the session object that ties them together.

pub mod analysis_service;
pub mod prompts;
pub mod refinement_service;
pub mod session;
pub mod synthesizer;

pub use analysis_service::{AnalysisService, AnalysisSource, UploadedFile, validate_url};
pub use prompts::PromptRenderer;
pub use refinement_service::{Critique, RefinementService};
pub use session::ForgeSession;
pub use synthesizer::InstructionSynthesizer;
