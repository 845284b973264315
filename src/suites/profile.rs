//! `GET Users/get-profile`.

use serde_json::Value;

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::AcceptMode;
use crate::http::response::ResponseOutcome;
use crate::testing::case::{NOT_ACCEPTABLE, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{auth_cases, numeric};

pub fn suite() -> Suite {
    Suite {
        name: "profile",
        resource: Resource::GetProfile,
        operation: Operation::List,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(identifies_the_user),
        seed: None,
    }
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let get = |label: &str, expected: &[u16], accept: AcceptMode| TestCase::new(label, expected).accept(accept);
    let mut cases = vec![
        get("ok", &[OK], AcceptMode::Json),
        get("accept_any", &[OK], AcceptMode::Any),
        get("no_accept", &[OK], AcceptMode::Absent),
        get("accept_xml", &[OK, NOT_ACCEPTABLE], AcceptMode::Xml),
    ];
    cases.extend(auth_cases(|label, expected| get(label, expected, AcceptMode::Json)));
    cases
}

pub fn shape() -> Shape {
    let entries = || [FieldType::List(Box::new(FieldType::Object(Schema::default())))];
    let mut schema = Schema::new([
        FieldRule::required("id", [FieldType::Integer]),
        FieldRule::required("email", [FieldType::Text]),
    ]);
    for name in ["nickname", "timezone", "joinDate", "lastLogin"] {
        schema = schema.rule(FieldRule::optional(name, [FieldType::Text]));
    }
    for name in ["hobbies", "interests", "userLanguages"] {
        schema = schema.rule(FieldRule::optional(name, entries()));
    }
    Shape::Object(schema)
}

/// A positive id and an email address.
pub fn identifies_the_user(_case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    if !outcome.field("id").and_then(numeric).is_some_and(|id| id > 0.0) {
        violations.push("`id` is not a positive number".to_string());
    }
    if !outcome.field("email").and_then(Value::as_str).is_some_and(|email| email.contains('@')) {
        violations.push("`email` is not an address".to_string());
    }
    violations
}
