use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::error::HarnessError;

use super::classify::Disposition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Xfail,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Xfail => "XFAIL",
        }
    }
}

/// Result of a single case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub suite: String,
    pub label: String,
    pub verdict: Verdict,
    /// `None` when no response arrived.
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub duration_ms: u128,
}

impl CaseResult {
    pub fn from_disposition(suite: &str, label: &str, status: u16, disposition: &Disposition, elapsed: Duration) -> Self {
        let (verdict, detail) = match disposition {
            Disposition::Pass => (Verdict::Pass, None),
            Disposition::Fail(failure) => (Verdict::Fail, Some(failure.to_string())),
            Disposition::ExpectedFailure { reason, .. } => (Verdict::Xfail, Some(reason.clone())),
        };
        Self {
            suite: suite.to_string(),
            label: label.to_string(),
            verdict,
            status: Some(status),
            detail,
            duration_ms: elapsed.as_millis(),
        }
    }

    /// The case could not complete: transport error, session setup, bad headers.
    pub fn from_error(suite: &str, label: &str, error: &HarnessError, elapsed: Duration) -> Self {
        Self {
            suite: suite.to_string(),
            label: label.to_string(),
            verdict: Verdict::Fail,
            status: None,
            detail: Some(error.to_string()),
            duration_ms: elapsed.as_millis(),
        }
    }
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
    pub duration_ms: u128,
    pub results: Vec<CaseResult>,
}

impl RunReport {
    pub fn record(&mut self, result: CaseResult) {
        self.total += 1;
        match result.verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Xfail => self.expected_failures += 1,
        }
        self.results.push(result);
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis();
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|result| result.verdict == Verdict::Fail)
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(self).map_err(|err| HarnessError::Config(format!("Failed to serialize report: {err}")))
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let status = result.status.map_or_else(|| "---".to_string(), |status| status.to_string());
            let _ = writeln!(
                out,
                "{:<5} {}::{} [{status}] {}ms",
                result.verdict.as_str(),
                result.suite,
                result.label,
                result.duration_ms
            );
            if result.verdict == Verdict::Xfail {
                if let Some(reason) = &result.detail {
                    let _ = writeln!(out, "      {reason}");
                }
            }
        }

        for failure in self.failures() {
            let _ = writeln!(out, "\n--- {}::{}", failure.suite, failure.label);
            if let Some(detail) = &failure.detail {
                let _ = writeln!(out, "{detail}");
            }
        }

        let _ = write!(
            out,
            "\n{} passed, {} failed, {} xfailed ({} total) in {}ms",
            self.passed, self.failed, self.expected_failures, self.total, self.duration_ms
        );
        out
    }
}
