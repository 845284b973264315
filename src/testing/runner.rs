//! Drives cases through the client, the classifier and suite invariants.

use std::fmt;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{AuthMode, Session, establish_session};
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::http::client::Transport;
use crate::http::response::ResponseOutcome;
use crate::resource::ResourceClient;

use super::case::{TestCase, ensure_unique_labels, render_segment};
use super::classify::{Disposition, Failure, FailureKind, classify};
use super::report::{CaseResult, RunReport};
use super::schema::Shape;

/// Builds the case table. Gets the config for run-label-prefixed values.
pub type CaseTable = fn(&HarnessConfig) -> Vec<TestCase>;
/// Business rules checked on a passing 2xx answer; empty means they hold.
pub type Invariant = fn(&TestCase, &ResponseOutcome) -> Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// POST the case payload to the resource.
    Create,
    /// GET the resource itself.
    List,
    /// GET `<resource>/<path param>`.
    Fetch,
    /// PUT the case payload to `<resource>/<path param>`.
    Replace,
    /// DELETE `<resource>/<path param>`.
    Terminate,
}

/// One endpoint's case table plus how to call and judge it.
#[derive(Clone, Copy)]
pub struct Suite {
    pub name: &'static str,
    pub resource: Resource,
    pub operation: Operation,
    /// Requires a bearer token; unauthenticated cases must be refused.
    pub protected: bool,
    pub check_options: bool,
    pub cases: CaseTable,
    pub shape: Option<fn() -> Shape>,
    pub invariant: Option<Invariant>,
    /// Payload POSTed as the session user to create the record that cases
    /// without a path parameter address.
    pub seed: Option<fn() -> Value>,
}

impl Suite {
    pub fn cases(&self, config: &HarnessConfig) -> Vec<TestCase> {
        (self.cases)(config)
    }

    pub fn case(&self, config: &HarnessConfig, label: &str) -> Option<TestCase> {
        self.cases(config).into_iter().find(|case| case.label() == label)
    }

    pub fn labels(&self, config: &HarnessConfig) -> Vec<String> {
        self.cases(config).iter().map(|case| case.label().to_string()).collect()
    }

    /// Sends a valid token, or creates its record first.
    pub fn needs_session(&self, case: &TestCase) -> bool {
        case.auth_mode() == AuthMode::Valid || (self.seed.is_some() && case.path_segment().is_none())
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("operation", &self.operation)
            .field("protected", &self.protected)
            .finish_non_exhaustive()
    }
}

/// What happened to one case.
#[derive(Debug, Clone)]
pub struct CaseRun {
    pub disposition: Disposition,
    pub status: u16,
    pub elapsed: Duration,
}

pub async fn execute_case<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    session: Option<&Session>,
    suite: &Suite,
    case: &TestCase,
) -> Result<CaseRun, HarnessError> {
    let started = Instant::now();
    let segment = match suite.operation {
        Operation::Create | Operation::List => None,
        Operation::Fetch | Operation::Replace | Operation::Terminate => {
            Some(item_segment(config, transport, session, suite, case).await?)
        }
    };
    let mut client = ResourceClient::for_case(config, transport, suite.resource, case, session)?;

    if suite.check_options {
        client.check_options().await?;
    }

    let outcome = match (suite.operation, segment) {
        (Operation::Create, _) => client.add(case.payload_value()).await?,
        (Operation::List, _) => client.list().await?,
        (Operation::Fetch, Some(id)) => client.get(&id).await?,
        (Operation::Replace, Some(id)) => client.update(&id, case.payload_value()).await?,
        (Operation::Terminate, Some(id)) => client.delete(&id).await?,
        (operation, None) => {
            return Err(HarnessError::Config(format!("{operation:?} of suite `{}` has no item to address", suite.name)));
        }
    };

    let shape = suite.shape.map(|shape| shape());
    let mut disposition = classify(case, &outcome, shape.as_ref(), client.history());

    if let (Disposition::Pass, Some(invariant)) = (&disposition, suite.invariant) {
        if outcome.is_success() {
            let violations = invariant(case, &outcome);
            if !violations.is_empty() {
                let failure = Failure::new(case, &outcome, client.history(), FailureKind::InvariantViolations(violations));
                disposition = Disposition::Fail(Box::new(failure));
            }
        }
    }

    log_disposition(suite.name, case.label(), outcome.status, &disposition);
    Ok(CaseRun {
        disposition,
        status: outcome.status,
        elapsed: started.elapsed(),
    })
}

/// Runs every case of every suite in order. A failing case never stops its
/// siblings. If the session bootstrap fails, every case that needs the
/// session fails with that error and the rest still run. Only an unusable
/// table aborts the run.
pub async fn run_suites<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    suites: &[Suite],
) -> Result<RunReport, HarnessError> {
    let started = Instant::now();
    let mut tables = Vec::with_capacity(suites.len());
    for suite in suites {
        let cases = suite.cases(config);
        ensure_unique_labels(&cases)?;
        tables.push((suite, cases));
    }

    let needs_session = tables
        .iter()
        .any(|(suite, cases)| cases.iter().any(|case| suite.needs_session(case)));
    let session = if needs_session {
        establish_session(config, transport).await.map(Some).inspect_err(|err| {
            warn!(error = %err, "session setup failed, authenticated cases will fail");
        })
    } else {
        Ok(None)
    };

    let mut report = RunReport::default();
    for (suite, cases) in tables {
        info!(suite = suite.name, cases = cases.len(), "running suite");
        for case in &cases {
            let case_started = Instant::now();
            let result = match &session {
                Err(err) if suite.needs_session(case) => {
                    CaseResult::from_error(suite.name, case.label(), err, Duration::ZERO)
                }
                session => {
                    let session = session.as_ref().ok().and_then(Option::as_ref);
                    match execute_case(config, transport, session, suite, case).await {
                        Ok(run) => CaseResult::from_disposition(
                            suite.name,
                            case.label(),
                            run.status,
                            &run.disposition,
                            run.elapsed,
                        ),
                        Err(err) => {
                            warn!(suite = suite.name, label = case.label(), error = %err, "case aborted");
                            CaseResult::from_error(suite.name, case.label(), &err, case_started.elapsed())
                        }
                    }
                }
            };
            report.record(result);
        }
    }

    report.finish(started.elapsed());
    info!(
        passed = report.passed,
        failed = report.failed,
        xfailed = report.expected_failures,
        "run finished"
    );
    Ok(report)
}

/// The case's own path parameter, or the id of a record created from the
/// suite's seed.
async fn item_segment<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    session: Option<&Session>,
    suite: &Suite,
    case: &TestCase,
) -> Result<String, HarnessError> {
    if let Some(segment) = case.path_segment() {
        return Ok(segment);
    }
    let (Some(seed), Some(session)) = (suite.seed, session) else {
        return Err(HarnessError::Config(format!(
            "case `{}` of suite `{}` needs a path parameter or a seeded record",
            case.label(),
            suite.name
        )));
    };

    let mut client = ResourceClient::for_session(config, transport, suite.resource, session);
    let outcome = client.add(seed()).await?;
    let id = outcome
        .field("id")
        .filter(|id| outcome.is_success() && !id.is_null())
        .map(render_segment);
    match id {
        Some(id) => {
            debug!(suite = suite.name, label = case.label(), id = %id, "seeded record");
            Ok(id)
        }
        None => Err(HarnessError::Seed {
            suite: suite.name,
            status: outcome.status,
            body: outcome.raw_body,
        }),
    }
}

fn log_disposition(suite: &str, label: &str, status: u16, disposition: &Disposition) {
    match disposition {
        Disposition::Pass => info!(suite, label, status, "PASS"),
        Disposition::Fail(failure) => info!(suite, label, status, reason = %failure.summary(), "FAIL"),
        Disposition::ExpectedFailure { reason, .. } => warn!(suite, label, status, reason = %reason, "XFAIL"),
    }
}
