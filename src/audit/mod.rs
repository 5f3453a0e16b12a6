//! Call-audit core: rubric, prompt, completion call, report decoding.
//!
//! This module provides:
//! * [`Rubric`] / [`Criterion`] and [`resolve_rubric`]: evaluation criteria.
//! * [`Transcript`]: validated transcript text.
//! * [`build_prompt`] / [`SYSTEM_INSTRUCTION`]: prompt construction.
//! * [`AuditReport`] and [`decode_report`]: the decoded result.
//! * [`AuditEngine`]: the whole pipeline, one completion call per audit.
//! * [`AnalysisError`]: stage-tagged failures.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use call_audit::audit::{resolve_rubric, AuditEngine, Transcript};
//! use call_audit::config::AppConfig;
//! use call_audit::llm::{Credential, OpenAiCompletion};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let engine = AuditEngine::new(
//!         Arc::new(OpenAiCompletion::from_config(&config.completion)),
//!         config.audit.clone(),
//!     );
//!
//!     let transcript = Transcript::new("Agent: Hello!", config.audit.max_transcript_bytes).unwrap();
//!     let rubric = resolve_rubric(Some(r#"{"tone": "Was the agent's tone friendly?"}"#)).unwrap();
//!
//!     match engine.analyze(&transcript, &rubric, &Credential::new("sk-...")).await {
//!         Ok(report) => println!("{}/10", report.overall_score),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod engine;
pub mod error;
pub mod prompt;
pub mod report;
pub mod rubric;
pub mod transcript;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::AuditEngine;
pub use error::{AnalysisError, ErrorCategory};
pub use prompt::{build_prompt, SYSTEM_INSTRUCTION};
pub use report::{decode_report, AuditReport, CriterionScore, DecodeError, DecodeErrorKind};
pub use rubric::{resolve_rubric, Criterion, Rubric, RubricError};
pub use transcript::{Transcript, TranscriptError};
