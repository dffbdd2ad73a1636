//! Quick-start project templates.
//!
//! A template is a static preset applied wholesale onto the project
//! configuration. Applying one never touches the project name and always
//! resets the constraints to the default catalog.

use super::stack::{KnownStack, StackTag};
use super::tone::Tone;
use serde::Serialize;

/// The configuration fields a template overwrites when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_stacks: Option<Vec<StackTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

/// A named, immutable preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: String,
    pub description: String,
    /// Icon tag understood by the presentation layer ("layers", "cpu", ...)
    pub icon: String,
    pub config: TemplateConfig,
}

fn stacks(known: &[KnownStack]) -> Option<Vec<StackTag>> {
    Some(known.iter().copied().map(StackTag::Known).collect())
}

/// Returns the built-in templates in display order.
pub fn get_default_templates() -> Vec<Template> {
    vec![
        Template {
            name: "Modern Fullstack".to_string(),
            description: "Next.js, TypeScript, Tailwind".to_string(),
            icon: "layers".to_string(),
            config: TemplateConfig {
                selected_stacks: stacks(&[
                    KnownStack::NextJs,
                    KnownStack::TypeScript,
                    KnownStack::TailwindCss,
                    KnownStack::NodeJs,
                ]),
                tone: Some(Tone::Professional),
                description: Some(
                    "Build a responsive web application with server-side rendering and type safety. \
                     Ensure components are modular and styled using utility classes."
                        .to_string(),
                ),
                additional_context: None,
            },
        },
        Template {
            name: "Local RP Assistant".to_string(),
            description: "Creative roleplay, Llama 3 optimized".to_string(),
            icon: "cpu".to_string(),
            config: TemplateConfig {
                selected_stacks: stacks(&[KnownStack::Generic]),
                tone: Some(Tone::Concise),
                description: Some(
                    "A creative roleplay assistant running locally. \
                     It should adapt to user scenarios without moralizing."
                        .to_string(),
                ),
                additional_context: None,
            },
        },
        Template {
            name: "Systems Programming".to_string(),
            description: "Rust, AWS".to_string(),
            icon: "database".to_string(),
            config: TemplateConfig {
                selected_stacks: stacks(&[KnownStack::Rust, KnownStack::Aws]),
                tone: Some(Tone::Concise),
                description: Some(
                    "Develop a high-performance lambda function. \
                     Focus on memory safety, concurrency, and efficient error handling."
                        .to_string(),
                ),
                additional_context: None,
            },
        },
    ]
}

/// Finds a built-in template by name, ignoring case.
pub fn find_template(name: &str) -> Option<Template> {
    let wanted = name.trim();
    get_default_templates()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(wanted))
}
