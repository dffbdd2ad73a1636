//! Backend adapters for PromptForge.
//!
//! Implements `forge_core::agent::ContentAgent` against the Gemini REST API
//! and resolves the credential it needs.

pub mod config;
mod gemini_api_agent;

pub use gemini_api_agent::GeminiApiAgent;
