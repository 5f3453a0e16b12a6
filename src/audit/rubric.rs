//! Evaluation criteria presented to the model.
//!
//! A [`Rubric`] is an insertion-ordered set of [`Criterion`]s keyed by name.
//! It is either the built-in default set or parsed from caller-supplied JSON
//! by [`resolve_rubric`].

use thiserror::Error;

// ---------------------------------------------------------------------------
// Default criteria
// ---------------------------------------------------------------------------

static DEFAULT_CRITERIA: &[(&str, &str)] = &[
    (
        "greeting",
        "Did the agent use a proper greeting and introduce themselves?",
    ),
    (
        "listening",
        "Did the agent actively listen to the customer's concerns?",
    ),
    (
        "problem_solving",
        "Did the agent demonstrate effective problem-solving skills?",
    ),
    (
        "knowledge",
        "Did the agent demonstrate sufficient product/service knowledge?",
    ),
    ("empathy", "Did the agent show empathy and understanding?"),
    (
        "clarity",
        "Was the agent's communication clear and easy to understand?",
    ),
    (
        "resolution",
        "Did the agent properly resolve the customer's issue?",
    ),
    ("closing", "Did the agent provide a proper closing to the call?"),
    (
        "adherence_to_protocol",
        "Did the agent follow company protocols and procedures?",
    ),
    (
        "professionalism",
        "Did the agent maintain professionalism throughout the call?",
    ),
];

// ---------------------------------------------------------------------------
// RubricError
// ---------------------------------------------------------------------------

/// Errors raised while building a rubric.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RubricError {
    /// Custom criteria text is not a JSON object of name → question strings.
    #[error("custom criteria must be a JSON object of name → question: {0}")]
    Malformed(String),

    /// A rubric needs at least one criterion.
    #[error("rubric has no criteria")]
    Empty,

    /// Two criteria share a name.
    #[error("duplicate criterion name: {0}")]
    DuplicateCriterion(String),
}

// ---------------------------------------------------------------------------
// Criterion
// ---------------------------------------------------------------------------

/// One named evaluation question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    name: String,
    question: String,
}

impl Criterion {
    pub fn new(name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            question: question.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

// ---------------------------------------------------------------------------
// Rubric
// ---------------------------------------------------------------------------

/// Ordered, non-empty set of criteria with unique names.
///
/// # Example
/// ```rust
/// use call_audit::audit::Rubric;
///
/// let rubric = Rubric::default_criteria();
/// assert_eq!(rubric.len(), 10);
/// assert!(rubric.get("empathy").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rubric {
    criteria: Vec<Criterion>,
}

impl Rubric {
    /// The built-in ten-criterion rubric.
    pub fn default_criteria() -> Self {
        Self {
            criteria: DEFAULT_CRITERIA
                .iter()
                .map(|(name, question)| Criterion::new(*name, *question))
                .collect(),
        }
    }

    /// Build a rubric from `(name, question)` pairs, keeping their order.
    pub fn from_pairs<I, N, Q>(pairs: I) -> Result<Self, RubricError>
    where
        I: IntoIterator<Item = (N, Q)>,
        N: Into<String>,
        Q: Into<String>,
    {
        let mut criteria: Vec<Criterion> = Vec::new();
        for (name, question) in pairs {
            let criterion = Criterion::new(name, question);
            if criteria.iter().any(|c| c.name == criterion.name) {
                return Err(RubricError::DuplicateCriterion(criterion.name));
            }
            criteria.push(criterion);
        }

        if criteria.is_empty() {
            return Err(RubricError::Empty);
        }
        Ok(Self { criteria })
    }

    /// Look up a criterion by name.
    pub fn get(&self, name: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    /// Criterion names in rubric order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// The rubric as a JSON object of name → question, in rubric order.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .criteria
            .iter()
            .map(|c| (c.name.clone(), serde_json::Value::String(c.question.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self::default_criteria()
    }
}

// ---------------------------------------------------------------------------
// resolve_rubric
// ---------------------------------------------------------------------------

/// Turn optional caller-supplied criteria JSON into a rubric.
///
/// * `None`, blank text, or `{}` → [`Rubric::default_criteria`].
/// * A JSON object whose values are all strings → that rubric, as-is and in
///   the given order. It is never merged with the defaults.
/// * Anything else → [`RubricError::Malformed`].
pub fn resolve_rubric(custom: Option<&str>) -> Result<Rubric, RubricError> {
    let text = match custom.map(str::trim) {
        None | Some("") => return Ok(Rubric::default_criteria()),
        Some(text) => text,
    };

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RubricError::Malformed(e.to_string()))?;

    let serde_json::Value::Object(map) = value else {
        return Err(RubricError::Malformed(format!(
            "expected an object, found {}",
            json_type_name(&value)
        )));
    };

    if map.is_empty() {
        return Ok(Rubric::default_criteria());
    }

    let mut pairs = Vec::with_capacity(map.len());
    for (name, question) in map {
        match question {
            serde_json::Value::String(question) => pairs.push((name, question)),
            other => {
                return Err(RubricError::Malformed(format!(
                    "criterion '{name}' must be a string, found {}",
                    json_type_name(&other)
                )))
            }
        }
    }

    Rubric::from_pairs(pairs)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
