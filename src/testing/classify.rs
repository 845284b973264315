//! Turns one response into PASS / FAIL / XFAIL.

use std::fmt::{self, Display};

use serde::Serialize;
use serde_json::Value;

use crate::error::HarnessError;
use crate::history::History;
use crate::http::response::ResponseOutcome;

use super::case::{StatusSet, TestCase};
use super::schema::Shape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum FailureKind {
    UnexpectedStatus,
    SchemaViolations(Vec<String>),
    MissingErrorText(String),
    ErrorCodeMismatch(String),
    /// A suite-level business rule did not hold on a successful response.
    InvariantViolations(Vec<String>),
}

/// Everything needed to understand a failed case without re-running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub label: String,
    pub kind: FailureKind,
    pub expected: StatusSet,
    pub actual: u16,
    pub body: String,
    pub history: String,
}

impl Failure {
    pub fn new(case: &TestCase, outcome: &ResponseOutcome, history: &History, kind: FailureKind) -> Self {
        Self {
            label: case.label().to_string(),
            kind,
            expected: case.expected().clone(),
            actual: outcome.status,
            body: outcome.raw_body.clone(),
            history: history.render(),
        }
    }

    pub fn summary(&self) -> String {
        match &self.kind {
            FailureKind::UnexpectedStatus => format!("expected {}, got {}", self.expected, self.actual),
            FailureKind::SchemaViolations(violations) => {
                format!("{} schema violation(s): {}", violations.len(), violations.join("; "))
            }
            FailureKind::MissingErrorText(needle) => format!("error body does not mention {needle:?}"),
            FailureKind::ErrorCodeMismatch(needle) => format!("error code does not contain {needle:?}"),
            FailureKind::InvariantViolations(violations) => violations.join("; "),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.label, self.summary())?;
        writeln!(f, "  expected: {}", self.expected)?;
        writeln!(f, "  actual:   {}", self.actual)?;
        writeln!(f, "  body:     {}", self.body)?;
        write!(f, "  history:\n{}", indent(&self.history))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Pass,
    Fail(Box<Failure>),
    /// The backend answered with a tracked defect status.
    ExpectedFailure { status: u16, reason: String },
}

impl Disposition {
    pub fn is_fail(&self) -> bool {
        matches!(self, Disposition::Fail(_))
    }

    pub fn into_result(self) -> Result<Disposition, HarnessError> {
        match self {
            Disposition::Fail(failure) => Err(HarnessError::Contract(failure)),
            other => Ok(other),
        }
    }
}

pub fn classify(case: &TestCase, outcome: &ResponseOutcome, shape: Option<&Shape>, history: &History) -> Disposition {
    let status = outcome.status;
    let fail = |kind| Disposition::Fail(Box::new(Failure::new(case, outcome, history, kind)));

    if let Some(defect) = case.defect().filter(|defect| defect.statuses.contains(status)) {
        return Disposition::ExpectedFailure {
            status,
            reason: defect.describe(),
        };
    }

    if !case.expected().contains(status) {
        return fail(FailureKind::UnexpectedStatus);
    }

    if outcome.is_success() {
        if let Some(shape) = shape {
            let violations = match &outcome.parsed_body {
                Some(body) => shape.validate(body),
                None => vec![format!(
                    "expected a JSON body, got content-type {:?} and {} byte(s)",
                    outcome.content_type(),
                    outcome.raw_body.len()
                )],
            };
            if !violations.is_empty() {
                return fail(FailureKind::SchemaViolations(violations));
            }
        }
        return Disposition::Pass;
    }

    if let Some(body) = &outcome.parsed_body {
        if let Some(needle) = case.expected_error() {
            if !mentions(body, needle) {
                return fail(FailureKind::MissingErrorText(needle.to_string()));
            }
        }
        if let (Some(needle), Some(code)) = (case.expected_error_code(), outcome.error_code()) {
            if !code.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()) {
                return fail(FailureKind::ErrorCodeMismatch(needle.to_string()));
            }
        }
    }

    Disposition::Pass
}

/// Case-insensitive search through the serialized error body.
fn mentions(body: &Value, needle: &str) -> bool {
    body.to_string().to_lowercase().contains(&needle.to_lowercase())
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n")
}
