//! # parley-llm
//!
//! Hosted language-model client for Parley. `GeminiClient` implements
//! `LanguageModelClient` over the Gemini `generateContent` REST endpoint.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiSettings};
