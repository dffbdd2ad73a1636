//! Backend-inferred partial configuration.

use super::stack::StackTag;
use super::tone::Tone;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;

/// Loosely-typed analysis payload as the backend returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAnalysis {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "selectedStacks", alias = "selected_stacks")]
    pub selected_stacks: Option<Vec<String>>,
    pub tone: Option<String>,
}

/// Partial configuration produced by the analysis adapter.
///
/// Every field is optional; `None` means "keep the existing value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub name: Option<String>,
    pub description: Option<String>,
    pub selected_stacks: Option<Vec<StackTag>>,
    pub tone: Option<Tone>,
}

impl AnalysisResult {
    /// Parses a backend body into a normalized result.
    ///
    /// Tolerates a surrounding markdown code fence.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let raw: RawAnalysis = serde_json::from_str(strip_code_fence(body))?;
        Ok(raw.into())
    }

    /// JSON schema sent with every analysis request.
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "description": { "type": "STRING" },
                "selectedStacks": { "type": "ARRAY", "items": { "type": "STRING" } },
                "tone": { "type": "STRING" }
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.selected_stacks.is_none()
            && self.tone.is_none()
    }
}

impl From<RawAnalysis> for AnalysisResult {
    fn from(raw: RawAnalysis) -> Self {
        let tone = raw.tone.as_deref().and_then(|value| {
            let parsed = Tone::parse(value);
            if parsed.is_none() && !value.trim().is_empty() {
                tracing::warn!("[Analysis] Ignoring unknown tone suggestion: {}", value);
            }
            parsed
        });

        Self {
            name: non_blank(raw.name),
            description: non_blank(raw.description),
            selected_stacks: raw
                .selected_stacks
                .map(normalize_stacks)
                .filter(|stacks| !stacks.is_empty()),
            tone,
        }
    }
}

/// Normalizes detected tags against the vocabulary.
///
/// Duplicates are dropped case-insensitively (first occurrence wins) and
/// unknown tags are kept verbatim.
pub fn normalize_stacks(raw: Vec<String>) -> Vec<StackTag> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|label| StackTag::parse(label))
        .filter(|tag| seen.insert(tag.dedup_key()))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let rest = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
