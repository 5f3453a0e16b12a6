//! Audit engine: transcript + rubric → prompt → completion → report.
//!
//! ```text
//! analyze_text(text, custom_criteria?, credential)
//!   ├─ Transcript::new          → AnalysisError::Transcript
//!   ├─ resolve_rubric           → AnalysisError::Rubric
//!   └─ analyze(transcript, rubric, credential)
//!         ├─ build_prompt
//!         ├─ CompletionService::complete (once)  → AnalysisError::Completion
//!         └─ decode_report                       → AnalysisError::Decode
//! ```
//!
//! The engine keeps no per-call state, so one instance can be shared across
//! concurrent calls behind an `Arc`. Nothing is retried.

use std::sync::Arc;

use crate::audit::error::AnalysisError;
use crate::audit::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::audit::report::{decode_report, AuditReport};
use crate::audit::rubric::{resolve_rubric, Rubric};
use crate::audit::transcript::Transcript;
use crate::config::AuditConfig;
use crate::llm::{CompletionRequest, CompletionService, Credential};

/// Runs call audits against a [`CompletionService`].
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use call_audit::audit::AuditEngine;
/// use call_audit::config::AppConfig;
/// use call_audit::llm::{Credential, OpenAiCompletion};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let engine = AuditEngine::new(
///     Arc::new(OpenAiCompletion::from_config(&config.completion)),
///     config.audit.clone(),
/// );
/// let report = engine
///     .analyze_text("Agent: Hello...", None, &Credential::new("sk-..."))
///     .await
///     .unwrap();
/// println!("overall: {}", report.overall_score);
/// # }
/// ```
pub struct AuditEngine {
    service: Arc<dyn CompletionService>,
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(service: Arc<dyn CompletionService>, config: AuditConfig) -> Self {
        Self { service, config }
    }

    /// Audit `transcript` against `rubric`.
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        rubric: &Rubric,
        credential: &Credential,
    ) -> Result<AuditReport, AnalysisError> {
        let prompt = build_prompt(transcript, rubric);
        log::info!(
            "Auditing transcript (len={}, criteria={}, prompt_len={})",
            transcript.len(),
            rubric.len(),
            prompt.len()
        );

        let request = CompletionRequest::json(SYSTEM_INSTRUCTION, prompt);
        let raw = self
            .service
            .complete(&request, credential)
            .await
            .map_err(|e| failed(e.into()))?;
        log::debug!("Completion returned {} bytes", raw.len());

        let report =
            decode_report(&raw, self.config.score_policy).map_err(|e| failed(e.into()))?;

        log::info!(
            "Audit complete (overall_score={}, criteria={})",
            report.overall_score,
            report.criteria_scores.len()
        );
        Ok(report)
    }

    /// Validate raw caller input, resolve the rubric, then [`analyze`](Self::analyze).
    ///
    /// The transcript is checked before the criteria, and both before any
    /// network call.
    pub async fn analyze_text(
        &self,
        transcript: &str,
        custom_criteria: Option<&str>,
        credential: &Credential,
    ) -> Result<AuditReport, AnalysisError> {
        let transcript = Transcript::new(transcript, self.config.max_transcript_bytes)
            .map_err(|e| failed(e.into()))?;
        let rubric = resolve_rubric(custom_criteria).map_err(|e| failed(e.into()))?;
        self.analyze(&transcript, &rubric, credential).await
    }
}

/// Log line for a failed audit. Payload text stays out; only its length.
fn failure_message(err: &AnalysisError) -> String {
    match err.raw_response() {
        Some(raw) => format!(
            "Audit failed at {} stage: {err} (payload len={})",
            err.stage(),
            raw.len()
        ),
        None => format!("Audit failed at {} stage: {err}", err.stage()),
    }
}

fn failed(err: AnalysisError) -> AnalysisError {
    log::warn!("{}", failure_message(&err));
    err
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
