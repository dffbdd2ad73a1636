//! Technology stack vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The fixed technology vocabulary offered by the stack selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum KnownStack {
    Python,
    TypeScript,
    React,
    #[strum(to_string = "Node.js")]
    NodeJs,
    #[strum(to_string = "Next.js")]
    NextJs,
    #[strum(to_string = "Tailwind CSS")]
    TailwindCss,
    Vue,
    Svelte,
    Angular,
    Go,
    Rust,
    #[strum(to_string = "C++")]
    Cpp,
    Java,
    #[strum(to_string = "C#")]
    CSharp,
    #[strum(to_string = "SQL")]
    Sql,
    #[strum(to_string = "PostgreSQL")]
    PostgreSql,
    #[strum(to_string = "MongoDB")]
    MongoDb,
    Docker,
    #[strum(to_string = "AWS")]
    Aws,
    Swift,
    Flutter,
    Generic,
}

/// Spellings the analysis backend commonly uses for vocabulary entries.
///
/// Keys are compared after [`squash`].
const ALIASES: &[(&str, KnownStack)] = &[
    ("nodejs", KnownStack::NodeJs),
    ("node", KnownStack::NodeJs),
    ("nextjs", KnownStack::NextJs),
    ("tailwind", KnownStack::TailwindCss),
    ("tailwindcss", KnownStack::TailwindCss),
    ("golang", KnownStack::Go),
    ("cpp", KnownStack::Cpp),
    ("csharp", KnownStack::CSharp),
    ("postgres", KnownStack::PostgreSql),
    ("postgresql", KnownStack::PostgreSql),
    ("mongo", KnownStack::MongoDb),
    ("mongodb", KnownStack::MongoDb),
    ("ts", KnownStack::TypeScript),
    ("reactjs", KnownStack::React),
    ("vuejs", KnownStack::Vue),
    ("amazonwebservices", KnownStack::Aws),
];

/// Lowercases and drops separators so "Node JS" and "node.js" compare equal.
fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl KnownStack {
    /// Resolves a label against the vocabulary, tolerating case and separators.
    pub fn lookup(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(known) = Self::from_str(trimmed) {
            return Some(known);
        }

        let key = squash(trimmed);
        Self::iter()
            .find(|known| squash(known.as_str()) == key)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == key)
                    .map(|(_, known)| *known)
            })
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A selected technology tag.
///
/// Tags outside the fixed vocabulary are kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StackTag {
    Known(KnownStack),
    Custom(String),
}

impl StackTag {
    /// Parses a free-form label; returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(
            KnownStack::lookup(trimmed)
                .map(Self::Known)
                .unwrap_or_else(|| Self::Custom(trimmed.to_string())),
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(known) => known.as_str(),
            Self::Custom(label) => label,
        }
    }

    /// Case-insensitive identity used for de-duplication.
    pub(crate) fn dedup_key(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Every entry of the fixed vocabulary, in display order.
    pub fn vocabulary() -> Vec<StackTag> {
        KnownStack::iter().map(Self::Known).collect()
    }
}

impl From<KnownStack> for StackTag {
    fn from(known: KnownStack) -> Self {
        Self::Known(known)
    }
}

impl From<String> for StackTag {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or(Self::Custom(raw))
    }
}

impl From<StackTag> for String {
    fn from(tag: StackTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for StackTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins tags for display ("Python, Rust").
pub fn join_stacks(stacks: &[StackTag]) -> String {
    stacks
        .iter()
        .map(StackTag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
