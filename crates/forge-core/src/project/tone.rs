//! Persona tone of the generated instruction.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Tone the target assistant should adopt.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Tone {
    #[default]
    Professional,
    Educational,
    Concise,
    Socratic,
}

impl Tone {
    /// Parses a backend-suggested tone; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    /// All tones in display order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}
