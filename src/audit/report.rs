//! Audit report types and decoding of the model's raw payload.
//!
//! [`decode_report`] never panics and never drops the payload: every failure
//! comes back as a [`DecodeError`] that still carries the raw text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScorePolicy;

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Score and commentary for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: f64,
    pub assessment: String,
    /// Quotations from the transcript, in the order the model gave them.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Keys the model added beyond the schema, passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Structured outcome of auditing one transcript.
///
/// Keys of `criteria_scores` are expected to match the rubric but that is
/// not enforced. They keep the order the model gave them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub overall_score: f64,
    pub criteria_scores: IndexMap<String, CriterionScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub summary: String,
    /// Top-level keys outside the schema, passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// What was wrong with the payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeErrorKind {
    /// Not parseable as JSON at all.
    #[error("response is not valid JSON: {0}")]
    Syntax(String),

    /// Valid JSON, but not shaped like an audit report.
    #[error("response does not match the report schema: {0}")]
    Shape(String),

    /// A score fell outside 1–10.
    #[error("{field} score {score} is outside 1-10")]
    ScoreOutOfRange { field: String, score: f64 },
}

/// Failure to decode the completion payload, with the payload attached.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to parse completion response: {kind}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    raw: String,
}

impl DecodeError {
    fn new(kind: DecodeErrorKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// The payload exactly as the service returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}

// ---------------------------------------------------------------------------
// decode_report
// ---------------------------------------------------------------------------

/// Decode `raw` into an [`AuditReport`].
///
/// Stages, each failing with its own [`DecodeErrorKind`]:
/// 1. JSON syntax.
/// 2. Report shape (required keys, field types). Unknown keys are kept in
///    the `extra` maps.
/// 3. Score range, only under [`ScorePolicy::Strict`].
///
/// # Example
/// ```rust
/// use call_audit::audit::decode_report;
/// use call_audit::config::ScorePolicy;
///
/// let err = decode_report("not valid json", ScorePolicy::Strict).unwrap_err();
/// assert_eq!(err.raw(), "not valid json");
/// ```
pub fn decode_report(raw: &str, policy: ScorePolicy) -> Result<AuditReport, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| DecodeError::new(DecodeErrorKind::Syntax(e.to_string()), raw))?;

    let report: AuditReport = serde_json::from_value(value)
        .map_err(|e| DecodeError::new(DecodeErrorKind::Shape(e.to_string()), raw))?;

    if policy == ScorePolicy::Strict {
        check_scores(&report).map_err(|kind| DecodeError::new(kind, raw))?;
    }

    Ok(report)
}

fn check_scores(report: &AuditReport) -> Result<(), DecodeErrorKind> {
    check_score("overall", report.overall_score)?;
    for (name, criterion) in &report.criteria_scores {
        check_score(name, criterion.score)?;
    }
    Ok(())
}

fn check_score(field: &str, score: f64) -> Result<(), DecodeErrorKind> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(DecodeErrorKind::ScoreOutOfRange {
            field: field.to_string(),
            score,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AuditReport {
        let mut criteria_scores = IndexMap::new();
        criteria_scores.insert(
            "empathy".to_string(),
            CriterionScore {
                score: 9.0,
                assessment: "Acknowledged the frustration right away.".into(),
                examples: vec![
                    "I'm sorry to hear that.".into(),
                    "I understand how annoying that is.".into(),
                ],
                extra: serde_json::Map::new(),
            },
        );
        criteria_scores.insert(
            "closing".to_string(),
            CriterionScore {
                score: 6.5,
                assessment: "Ended abruptly.".into(),
                examples: vec![],
                extra: serde_json::Map::new(),
            },
        );

        AuditReport {
            overall_score: 7.5,
            criteria_scores,
            strengths: vec!["Warm tone".into()],
            areas_for_improvement: vec!["Summarise next steps".into(), "Offer survey".into()],
            summary: "Solid call with a weak close.".into(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn round_trip_is_identity() {
        let report = sample_report();
        let raw = serde_json::to_string(&report).unwrap();

        let decoded = decode_report(&raw, ScorePolicy::Strict).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn decodes_integer_scores_and_keeps_unknown_keys() {
        let raw = r#"{
            "overall_score": 8,
            "criteria_scores": {
                "greeting": {"score": 9, "assessment": "Good.", "examples": ["Hello, how can I help?"]}
            },
            "strengths": ["Polite"],
            "areas_for_improvement": [],
            "summary": "Fine.",
            "confidence": "high"
        }"#;

        let report = decode_report(raw, ScorePolicy::Strict).unwrap();
        assert_eq!(report.overall_score, 8.0);
        assert_eq!(report.criteria_scores["greeting"].score, 9.0);
        assert_eq!(
            report.criteria_scores["greeting"].examples,
            ["Hello, how can I help?"]
        );
        assert_eq!(report.extra["confidence"], "high");
    }

    #[test]
    fn extra_keys_survive_re_encoding() {
        let raw = r#"{
            "overall_score": 8,
            "criteria_scores": {
                "zeta": {"score": 8, "assessment": "a", "examples": [], "confidence": "high"},
                "alpha": {"score": 6, "assessment": "b"}
            },
            "strengths": [],
            "areas_for_improvement": [],
            "summary": "s",
            "call_type": "billing"
        }"#;

        let report = decode_report(raw, ScorePolicy::Strict).unwrap();
        assert_eq!(report.extra["call_type"], "billing");
        assert_eq!(report.criteria_scores["zeta"].extra["confidence"], "high");
        assert!(report.criteria_scores["alpha"].extra.is_empty());

        let encoded: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(encoded["call_type"], "billing");
        assert_eq!(encoded["criteria_scores"]["zeta"]["confidence"], "high");
        assert_eq!(decode_report(&encoded.to_string(), ScorePolicy::Strict).unwrap(), report);
    }

    #[test]
    fn criteria_keep_model_order() {
        let raw = r#"{
            "overall_score": 7,
            "criteria_scores": {
                "zeta": {"score": 7, "assessment": "z"},
                "alpha": {"score": 7, "assessment": "a"},
                "mid": {"score": 7, "assessment": "m"}
            },
            "strengths": [], "areas_for_improvement": [], "summary": ""
        }"#;

        let report = decode_report(raw, ScorePolicy::Strict).unwrap();
        assert_eq!(
            report.criteria_scores.keys().collect::<Vec<_>>(),
            ["zeta", "alpha", "mid"]
        );

        let encoded = serde_json::to_string(&report).unwrap();
        let zeta = encoded.find("\"zeta\"").unwrap();
        let alpha = encoded.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn missing_examples_default_to_empty() {
        let raw = r#"{"overall_score": 5, "criteria_scores": {"tone": {"score": 5, "assessment": "ok"}},
                      "strengths": [], "areas_for_improvement": [], "summary": ""}"#;
        let report = decode_report(raw, ScorePolicy::Strict).unwrap();
        assert!(report.criteria_scores["tone"].examples.is_empty());
    }

    #[test]
    fn non_json_keeps_raw_text() {
        for raw in ["not valid json", "", "{\"overall_score\": 8, \"crit", "Sure! Here is"] {
            let err = decode_report(raw, ScorePolicy::Strict).unwrap_err();
            assert!(matches!(err.kind(), DecodeErrorKind::Syntax(_)), "raw: {raw:?}");
            assert_eq!(err.raw(), raw);
        }
    }

    #[test]
    fn wrong_shape_keeps_raw_text() {
        let raw = r#"{"overall_score": "eight", "summary": "x"}"#;
        let err = decode_report(raw, ScorePolicy::Strict).unwrap_err();

        assert!(matches!(err.kind(), DecodeErrorKind::Shape(_)));
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn missing_required_key_is_shape_error() {
        let mut value = serde_json::to_value(sample_report()).unwrap();
        value.as_object_mut().unwrap().remove("summary");
        let raw = value.to_string();

        let err = decode_report(&raw, ScorePolicy::Lenient).unwrap_err();
        match err.kind() {
            DecodeErrorKind::Shape(msg) => assert!(msg.contains("summary"), "msg: {msg}"),
            other => panic!("expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn strict_policy_rejects_out_of_range_scores() {
        let mut report = sample_report();
        report.criteria_scores.get_mut("closing").unwrap().score = 11.0;
        let raw = serde_json::to_string(&report).unwrap();

        let err = decode_report(&raw, ScorePolicy::Strict).unwrap_err();
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::ScoreOutOfRange {
                field: "closing".into(),
                score: 11.0
            }
        );
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn strict_policy_checks_overall_score() {
        let mut report = sample_report();
        report.overall_score = 0.0;
        let raw = serde_json::to_string(&report).unwrap();

        let err = decode_report(&raw, ScorePolicy::Strict).unwrap_err();
        assert!(matches!(
            err.kind(),
            DecodeErrorKind::ScoreOutOfRange { field, .. } if field == "overall"
        ));
    }

    #[test]
    fn lenient_policy_passes_scores_through() {
        let mut report = sample_report();
        report.overall_score = 42.0;
        let raw = serde_json::to_string(&report).unwrap();

        let decoded = decode_report(&raw, ScorePolicy::Lenient).unwrap();
        assert_eq!(decoded.overall_score, 42.0);
    }

    #[test]
    fn error_message_names_the_problem() {
        let err = decode_report("nope", ScorePolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
        assert_eq!(err.into_raw(), "nope");
    }
}
