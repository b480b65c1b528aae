//! # parley-verticals
//!
//! The two conversational domains shipped with Parley:
//!
//! 1. **Support desk** (`support`): classifies GizmoTron 5000 support queries
//!    and answers them from a mock warranty table and knowledge base, opening
//!    tickets in the record store on request.
//! 2. **Medical scribe** (`scribe`): turns doctor/patient transcripts into
//!    structured EHR entries and saves them to the record store.
//!
//! All product and patient data is hardcoded and fictional.

pub mod scribe;
pub mod support;

pub use scribe::MedicalScribe;
pub use support::SupportDesk;

/// Reply given when the model provider rejects a call for quota reasons.
pub const QUOTA_EXCEEDED: &str = "You exceeded your current quota.";
