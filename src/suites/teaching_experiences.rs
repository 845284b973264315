//! `POST TeachingExperiences`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::response::ResponseOutcome;
use crate::testing::case::{CREATED, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{VALIDATION, auth_cases, current_year, is_iso_timestamp, numeric};

pub const MAX_ORGANIZATION: usize = 200;
pub const MAX_POSITION: usize = 100;
pub const EARLIEST_START_YEAR: i64 = 1960;

pub fn suite() -> Suite {
    Suite {
        name: "teaching_experiences",
        resource: Resource::TeachingExperiences,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(experience_rules),
        seed: None,
    }
}

pub fn payload(organization: &str, position: &str, start_year: i64, finish_year: Option<i64>) -> Value {
    json!({
        "organization": organization,
        "position": position,
        "description": "Taught grammar and conversation",
        "startYear": start_year,
        "finishYear": finish_year,
    })
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let year = current_year();
    let saved: &[u16] = &[OK, CREATED];
    let experience = |label: &str, expected: &[u16]| {
        TestCase::new(label, expected).payload(payload("Language School", "Teacher", year - 4, Some(year - 1)))
    };

    let mut cases = vec![
        experience("valid", saved),
        experience("valid_ongoing", saved).field("finishYear", Value::Null),
    ];
    cases.extend(auth_cases(|label, expected| experience(label, expected)));
    cases.extend([
        experience("organization_empty", VALIDATION).field("organization", json!("")),
        experience("organization_long", VALIDATION).field("organization", json!("o".repeat(MAX_ORGANIZATION + 1))),
        experience("position_long", VALIDATION).field("position", json!("p".repeat(MAX_POSITION + 1))),
        experience("start_year_before_1960", VALIDATION).field("startYear", json!(EARLIEST_START_YEAR - 10)),
        experience("finish_in_future", VALIDATION).field("finishYear", json!(year + 1)),
        experience("finish_before_start", VALIDATION)
            .field("startYear", json!(year - 1))
            .field("finishYear", json!(year - 3)),
    ]);
    cases
}

pub fn shape() -> Shape {
    Shape::Object(Schema::new([
        FieldRule::required("id", [FieldType::Integer]),
        FieldRule::required("teacherId", [FieldType::Integer]),
        FieldRule::required("organization", [FieldType::Text]),
        FieldRule::required("position", [FieldType::Text]),
        FieldRule::required("startYear", [FieldType::Integer]),
        FieldRule::optional("finishYear", [FieldType::Integer]),
        FieldRule::optional("description", [FieldType::Text]),
        FieldRule::optional("createdAt", [FieldType::Text]),
        FieldRule::optional("updatedAt", [FieldType::Text]),
    ]))
}

/// Timestamps are ISO UTC, years are ordered, the organization is echoed.
pub fn experience_rules(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    for name in ["createdAt", "updatedAt"] {
        if let Some(stamp) = outcome.field(name).and_then(Value::as_str) {
            if !is_iso_timestamp(stamp) {
                violations.push(format!("`{name}` {stamp:?} is not an ISO UTC timestamp"));
            }
        }
    }
    let start = outcome.field("startYear").and_then(numeric);
    let finish = outcome.field("finishYear").and_then(numeric);
    if let (Some(start), Some(finish)) = (start, finish) {
        if finish < start {
            violations.push(format!("`finishYear` {finish} is before `startYear` {start}"));
        }
    }
    if let Some(sent) = case.payload_field("organization") {
        let echoed = outcome.field("organization").unwrap_or(&Value::Null);
        if echoed != sent {
            violations.push(format!("`organization` echoed as {echoed}, sent {sent}"));
        }
    }
    violations
}
