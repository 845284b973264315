use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display};

use serde_json::{Map, Value};

use crate::auth::AuthMode;
use crate::error::HarnessError;
use crate::http::negotiation::{AcceptMode, ContentTypeMode};

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const NOT_ACCEPTABLE: u16 = 406;
pub const CONFLICT: u16 = 409;
pub const GONE: u16 = 410;
pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Non-empty set of acceptable status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSet(BTreeSet<u16>);

impl StatusSet {
    /// Panics on an empty slice: a case table without expectations is a
    /// defect in the table itself.
    pub fn of(codes: &[u16]) -> Self {
        assert!(!codes.is_empty(), "expected status set must not be empty");
        Self(codes.iter().copied().collect())
    }

    pub fn contains(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn is_subset_of(&self, allowed: &[u16]) -> bool {
        self.0.iter().all(|status| allowed.contains(status))
    }

    /// The success status when exactly one 2xx code is expected.
    pub fn single_success(&self) -> Option<u16> {
        let mut successes = self.iter().filter(|status| (200..300).contains(status));
        match (successes.next(), successes.next()) {
            (Some(status), None) => Some(status),
            _ => None,
        }
    }

    pub fn union(&self, other: &[u16]) -> Self {
        let mut codes = self.0.clone();
        codes.extend(other.iter().copied());
        Self(codes)
    }
}

impl Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.0.iter().map(u16::to_string).collect();
        write!(f, "{{{}}}", codes.join(", "))
    }
}

/// A status the backend currently answers with because of a tracked bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownDefect {
    pub statuses: StatusSet,
    pub reason: String,
    pub ticket: Option<String>,
}

impl KnownDefect {
    pub fn new(statuses: &[u16], reason: impl Into<String>) -> Self {
        Self {
            statuses: StatusSet::of(statuses),
            reason: reason.into(),
            ticket: None,
        }
    }

    pub fn with_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.ticket = Some(ticket.into());
        self
    }

    pub fn describe(&self) -> String {
        match &self.ticket {
            Some(ticket) => format!("{} [{ticket}]", self.reason),
            None => self.reason.clone(),
        }
    }
}

/// One parameterized scenario against one endpoint.
#[derive(Debug, Clone)]
pub struct TestCase {
    label: String,
    payload: Map<String, Value>,
    path_param: Option<Value>,
    auth: AuthMode,
    accept: AcceptMode,
    content_type: ContentTypeMode,
    expected: StatusSet,
    error_contains: Option<String>,
    error_code_contains: Option<String>,
    known_defect: Option<KnownDefect>,
}

impl TestCase {
    pub fn new(label: impl Into<String>, expected: &[u16]) -> Self {
        Self {
            label: label.into(),
            payload: Map::new(),
            path_param: None,
            auth: AuthMode::Valid,
            accept: AcceptMode::Json,
            content_type: ContentTypeMode::Json,
            expected: StatusSet::of(expected),
            error_contains: None,
            error_code_contains: None,
            known_defect: None,
        }
    }

    /// Adds one payload field; the value is sent exactly as given.
    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.payload.insert(name.to_string(), value);
        self
    }

    /// Replaces the whole payload. Non-object values are ignored.
    pub fn payload(mut self, payload: Value) -> Self {
        if let Value::Object(map) = payload {
            self.payload = map;
        }
        self
    }

    pub fn path_param(mut self, value: Value) -> Self {
        self.path_param = Some(value);
        self
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn accept(mut self, accept: AcceptMode) -> Self {
        self.accept = accept;
        self
    }

    pub fn content_type(mut self, content_type: ContentTypeMode) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn error_contains(mut self, needle: &str) -> Self {
        self.error_contains = Some(needle.to_string());
        self
    }

    pub fn error_code_contains(mut self, needle: &str) -> Self {
        self.error_code_contains = Some(needle.to_string());
        self
    }

    pub fn known_defect(mut self, defect: KnownDefect) -> Self {
        self.known_defect = Some(defect);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn payload_value(&self) -> Value {
        Value::Object(self.payload.clone())
    }

    pub fn payload_field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    pub fn path_segment(&self) -> Option<String> {
        self.path_param.as_ref().map(render_segment)
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth
    }

    pub fn accept_mode(&self) -> AcceptMode {
        self.accept
    }

    pub fn content_type_mode(&self) -> ContentTypeMode {
        self.content_type
    }

    pub fn expected(&self) -> &StatusSet {
        &self.expected
    }

    pub fn expected_error(&self) -> Option<&str> {
        self.error_contains.as_deref()
    }

    pub fn expected_error_code(&self) -> Option<&str> {
        self.error_code_contains.as_deref()
    }

    pub fn defect(&self) -> Option<&KnownDefect> {
        self.known_defect.as_ref()
    }
}

/// Strings go in raw, everything else in its JSON spelling.
pub fn render_segment(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Labels double as test names, so they must be unique within a table.
pub fn ensure_unique_labels(cases: &[TestCase]) -> Result<(), HarnessError> {
    let mut seen = HashSet::new();
    for case in cases {
        if !seen.insert(case.label()) {
            return Err(HarnessError::DuplicateLabel(case.label().to_string()));
        }
    }
    Ok(())
}
