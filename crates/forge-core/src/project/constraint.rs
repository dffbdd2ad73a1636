//! Behavioral constraints and the fixed default catalog.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Well-known constraint identifiers.
pub mod ids {
    pub const LOCAL_LLM_OPT: &str = "local-llm-opt";
    pub const NSFW_ALLOW: &str = "nsfw-allow";
    pub const NO_BREAK_CHANGES: &str = "no-break-changes";
    pub const SYNTAX_STRICT: &str = "syntax-strict";
    pub const JSON_MODE: &str = "json-mode";
    pub const EXAMPLE_CODE: &str = "example-code";
    pub const SECURITY_OWASP: &str = "security-owasp";
    pub const CHAIN_OF_THOUGHT: &str = "chain-of-thought";
    pub const ERROR_HANDLING: &str = "error-handling";
    pub const ALLOW_MISTAKES: &str = "allow-mistakes";
}

/// Grouping shown next to a constraint in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConstraintCategory {
    Safety,
    Style,
    Performance,
    Compatibility,
    Optimization,
    Content,
}

/// A named, toggleable behavioral rule.
///
/// Identity is `id`; only `active` ever changes after the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub label: String,
    pub description: String,
    pub active: bool,
    pub category: ConstraintCategory,
}

impl Constraint {
    fn new(
        id: &str,
        label: &str,
        description: &str,
        active: bool,
        category: ConstraintCategory,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            active,
            category,
        }
    }
}

/// Returns the full default constraint catalog in display order.
pub fn default_constraints() -> Vec<Constraint> {
    use ConstraintCategory::*;

    vec![
        Constraint::new(
            ids::LOCAL_LLM_OPT,
            "Local LLM Optimization",
            "Optimize for LM Studio/Ollama (Llama 3, Mistral). Uses standard headers and concise reasoning.",
            false,
            Optimization,
        ),
        Constraint::new(
            ids::NSFW_ALLOW,
            "Allow 18+ Content",
            "Permit mature themes for consensual, fictional creative writing.",
            false,
            Content,
        ),
        Constraint::new(
            ids::NO_BREAK_CHANGES,
            "Prevent Breaking Changes",
            "Explicitly instruct the LLM to prioritize backward compatibility.",
            true,
            Compatibility,
        ),
        Constraint::new(
            ids::SYNTAX_STRICT,
            "Strict Syntax Adherence",
            "Enforce idiomatic patterns (e.g., Python 3.10+ match case, ES6+).",
            true,
            Style,
        ),
        Constraint::new(
            ids::JSON_MODE,
            "JSON Output Only",
            "Force all responses to be valid JSON for machine parsing.",
            false,
            Style,
        ),
        Constraint::new(
            ids::EXAMPLE_CODE,
            "Require Code Examples",
            "Instruct the LLM to always provide a code snippet.",
            true,
            Style,
        ),
        Constraint::new(
            ids::SECURITY_OWASP,
            "OWASP Security First",
            "Mandate input validation and sanitization against top web vulnerabilities.",
            false,
            Safety,
        ),
        Constraint::new(
            ids::CHAIN_OF_THOUGHT,
            "Chain of Thought (CoT)",
            "Force step-by-step reasoning before providing the final answer.",
            false,
            Optimization,
        ),
        Constraint::new(
            ids::ERROR_HANDLING,
            "Robust Error Handling",
            "Require try/except blocks for all external operations.",
            false,
            Safety,
        ),
        Constraint::new(
            ids::ALLOW_MISTAKES,
            "Allow Creative Hallucination",
            "Loosen constraints to allow the LLM to invent libraries (experimental).",
            false,
            Safety,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_count() {
        assert_eq!(default_constraints().len(), 10);
    }

    #[test]
    fn test_default_catalog_has_unique_ids() {
        let mut seen = std::collections::HashSet::new();
        for constraint in default_constraints() {
            assert!(
                seen.insert(constraint.id.clone()),
                "Constraint IDs must be unique, found duplicate: {}",
                constraint.id
            );
        }
    }

    #[test]
    fn test_default_active_flags() {
        let active: Vec<String> = default_constraints()
            .into_iter()
            .filter(|c| c.active)
            .map(|c| c.id)
            .collect();
        assert_eq!(
            active,
            vec![ids::NO_BREAK_CHANGES, ids::SYNTAX_STRICT, ids::EXAMPLE_CODE]
        );
    }

    #[test]
    fn test_adult_content_entry_is_fiction_scoped() {
        let catalog = default_constraints();
        let entry = catalog
            .iter()
            .find(|c| c.id == ids::NSFW_ALLOW)
            .expect("nsfw-allow should be in the catalog");
        assert_eq!(entry.label, "Allow 18+ Content");
        assert_eq!(entry.category, ConstraintCategory::Content);
        assert!(entry.description.contains("fictional"));
        assert!(!entry.description.contains("override refusal"));
    }
}
