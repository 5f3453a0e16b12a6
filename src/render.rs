//! Plain-text rendering of an [`AuditReport`].
//!
//! Layout (Markdown-flavoured, readable in a terminal):
//!
//! ```text
//! # Call Audit Results
//! Overall Score: 8/10 (Good)
//! ## Strengths / ## Areas for Improvement / ## Summary
//! ## Criteria Scores       ← rubric order, then any extra keys
//! ## Original Transcript   ← only when a transcript is passed in
//! ```

use std::fmt::Write as _;

use crate::audit::{AuditReport, CriterionScore, Rubric, Transcript};

// ---------------------------------------------------------------------------
// ScoreBand
// ---------------------------------------------------------------------------

/// Coarse rating used to label a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Below 4.
    Poor,
    /// 4 up to (not including) 7.
    Fair,
    /// 7 and above.
    Good,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score < 4.0 {
            ScoreBand::Poor
        } else if score < 7.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Poor => "Poor",
            ScoreBand::Fair => "Fair",
            ScoreBand::Good => "Good",
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `adherence_to_protocol` → `Adherence To Protocol`.
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Integral scores print without a fractional part.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        format!("{score:.1}")
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out, "## {heading}\n");
    if items.is_empty() {
        out.push_str("(none)\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

fn push_criterion(out: &mut String, name: &str, details: &CriterionScore) {
    let _ = writeln!(
        out,
        "### {} - {}/10 ({})\n",
        title_case(name),
        format_score(details.score),
        ScoreBand::for_score(details.score).label()
    );
    let _ = writeln!(out, "{}\n", details.assessment);
    if !details.examples.is_empty() {
        out.push_str("Examples:\n");
        for example in &details.examples {
            let _ = writeln!(out, "- \"{example}\"");
        }
        out.push('\n');
    }
}

// ---------------------------------------------------------------------------
// render_text
// ---------------------------------------------------------------------------

/// Render `report` for display.
///
/// Criteria are listed in `rubric` order; report keys the rubric does not
/// name follow in the order the model gave them. Rubric criteria missing
/// from the report are listed as not scored.
pub fn render_text(report: &AuditReport, rubric: &Rubric, transcript: Option<&Transcript>) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("# Call Audit Results\n\n");
    let _ = writeln!(
        out,
        "Overall Score: {}/10 ({})\n",
        format_score(report.overall_score),
        ScoreBand::for_score(report.overall_score).label()
    );

    push_list(&mut out, "Strengths", &report.strengths);
    push_list(&mut out, "Areas for Improvement", &report.areas_for_improvement);

    let _ = writeln!(out, "## Summary\n\n{}\n", report.summary);

    out.push_str("## Criteria Scores\n\n");
    for name in rubric.names() {
        match report.criteria_scores.get(name) {
            Some(details) => push_criterion(&mut out, name, details),
            None => {
                let _ = writeln!(out, "### {} - not scored\n", title_case(name));
            }
        }
    }
    for (name, details) in &report.criteria_scores {
        if rubric.get(name).is_none() {
            push_criterion(&mut out, name, details);
        }
    }

    if let Some(transcript) = transcript {
        let _ = writeln!(out, "## Original Transcript\n\n{}", transcript.as_str());
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
