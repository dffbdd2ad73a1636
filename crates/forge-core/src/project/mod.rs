//! Project configuration domain module.
//!
//! # Module Structure
//!
//! - `model`: the mutable session configuration (`ProjectConfig`)
//! - `stack`: technology vocabulary (`KnownStack`, `StackTag`)
//! - `tone`: persona tone enumeration
//! - `constraint`: constraint type and the default catalog
//! - `template`: quick-start presets
//! - `analysis`: backend-inferred partial configuration and its normalization

mod analysis;
mod constraint;
mod model;
mod stack;
mod template;
mod tone;

// Re-export public API
pub use analysis::{AnalysisResult, RawAnalysis, normalize_stacks};
pub use constraint::{Constraint, ConstraintCategory, default_constraints, ids};
pub use model::ProjectConfig;
pub use stack::{KnownStack, StackTag, join_stacks};
pub use template::{Template, TemplateConfig, find_template, get_default_templates};
pub use tone::Tone;
