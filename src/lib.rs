//! Call Audit: scores customer-support call transcripts with an LLM.
//!
//! * [`audit`]: rubric, prompt, report decoding and the [`audit::AuditEngine`].
//! * [`llm`]: completion-service trait and the OpenAI-compatible backend.
//! * [`config`]: TOML settings.
//! * [`render`]: plain-text report rendering.

pub mod audit;
pub mod config;
pub mod llm;
pub mod render;
