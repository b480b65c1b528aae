//! # parley-core
//!
//! The schema-constrained extraction and intent-routing pipeline.
//!
//! This crate provides:
//! - The seam traits (`LanguageModelClient`, `OutputParser`, `RecordStore`,
//!   `ActionSet`)
//! - Prompt construction with few-shot priming (`prompt`)
//! - The `ExtractionAgent` with its bounded retry/fallback policy
//! - The `IntentRouter`
//! - The line-oriented `Conversation` loop and its `Vertical` trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parley_core::{ExtractionAgent, IntentRouter, prompt::ExtractionTask};
//!
//! let agent = ExtractionAgent::new(Box::new(client), Box::new(parser));
//! let intent: IntentResult = agent.extract_as("hello", &task)?;
//! let action = IntentRouter::new().route(&intent);
//! ```

pub mod conversation;
pub mod extraction;
pub mod prompt;
pub mod router;
pub mod traits;

pub use conversation::{Conversation, Vertical};
pub use extraction::ExtractionAgent;
pub use router::IntentRouter;
