//! Domain layer for PromptForge.
//!
//! Holds the project configuration model, the static catalogs (stack
//! vocabulary, constraint catalog, templates), the backend port used by the
//! higher layers, and the shared error type.

pub mod agent;
pub mod config;
pub mod error;
pub mod project;

pub use error::{ForgeError, Result};
