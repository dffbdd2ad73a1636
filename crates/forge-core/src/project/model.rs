use super::analysis::AnalysisResult;
use super::constraint::{Constraint, default_constraints};
use super::stack::{KnownStack, StackTag};
use super::template::Template;
use super::tone::Tone;
use serde::Serialize;

/// The user-chosen project parameters that drive instruction synthesis.
///
/// `constraints` always holds the complete catalog; mutation only flips
/// `active` flags, which is why the field is private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
    /// Insertion order is display order.
    pub selected_stacks: Vec<StackTag>,
    pub additional_context: String,
    constraints: Vec<Constraint>,
    pub tone: Tone,
}

impl Default for ProjectConfig {
    /// Session-start state: one default stack and the default catalog.
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            selected_stacks: vec![StackTag::Known(KnownStack::Python)],
            additional_context: String::new(),
            constraints: default_constraints(),
            tone: Tone::default(),
        }
    }
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn active_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.active)
    }

    pub fn is_constraint_active(&self, id: &str) -> bool {
        self.constraints.iter().any(|c| c.id == id && c.active)
    }

    /// Flips the `active` flag of the constraint with the given id.
    ///
    /// Returns `false` (and changes nothing) when the id is not in the catalog.
    pub fn toggle_constraint(&mut self, id: &str) -> bool {
        match self.constraints.iter_mut().find(|c| c.id == id) {
            Some(constraint) => {
                constraint.active = !constraint.active;
                true
            }
            None => false,
        }
    }

    /// Adds the tag when absent, removes it when present.
    ///
    /// Returns whether the tag is selected afterwards. Order of the remaining
    /// entries is preserved.
    pub fn toggle_stack(&mut self, tag: StackTag) -> bool {
        match self.selected_stacks.iter().position(|s| *s == tag) {
            Some(index) => {
                self.selected_stacks.remove(index);
                false
            }
            None => {
                self.selected_stacks.push(tag);
                true
            }
        }
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// Overwrites the fields the template carries and resets the constraints
    /// to the default catalog. The project name is kept.
    pub fn apply_template(&mut self, template: &Template) {
        let preset = &template.config;
        if let Some(stacks) = &preset.selected_stacks {
            self.selected_stacks = stacks.clone();
        }
        if let Some(tone) = preset.tone {
            self.tone = tone;
        }
        if let Some(description) = &preset.description {
            self.description = description.clone();
        }
        if let Some(context) = &preset.additional_context {
            self.additional_context = context.clone();
        }
        self.constraints = default_constraints();
    }

    /// Merges an analysis field by field: incoming value wins if present.
    pub fn merge_analysis(&mut self, result: AnalysisResult) {
        if let Some(name) = result.name {
            self.name = name;
        }
        if let Some(description) = result.description {
            self.description = description;
        }
        if let Some(stacks) = result.selected_stacks {
            self.selected_stacks = stacks;
        }
        if let Some(tone) = result.tone {
            self.tone = tone;
        }
    }

    /// Submission requires a non-blank description.
    pub fn can_submit(&self) -> bool {
        !self.description.trim().is_empty()
    }
}
