//! `POST TeacherEducations`, plus the payload, shape and rules shared by the
//! by-id suites.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::response::ResponseOutcome;
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, INTERNAL_SERVER_ERROR, KnownDefect, OK, TestCase, UNPROCESSABLE_ENTITY,
};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{VALIDATION, auth_cases, current_year, numeric, teacher_documents};

pub const NOT_FOUND_CODE: &str = "teacherEducation.TeacherEducation.notFound";
pub const MAX_INSTITUTION: usize = 200;
pub const MAX_FIELD_OF_STUDY: usize = 100;

/// Boundary years the backend may or may not take.
const SAVED_OR_REJECTED: &[u16] = &[OK, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY];

pub fn suite() -> Suite {
    Suite {
        name: "teacher_educations",
        resource: Resource::TeacherEducations,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(education_rules),
        seed: None,
    }
}

pub fn payload(institution: &str, degree_id: i64, field_of_study: &str, start_year: i64, finish_year: i64) -> Value {
    json!({
        "institutionName": institution,
        "degreeId": degree_id,
        "fieldOfStudy": field_of_study,
        "startYear": start_year,
        "finishYear": finish_year,
    })
}

pub fn seed() -> Value {
    let year = current_year();
    payload("Test University", 1, "Mathematics", year - 5, year - 1)
}

fn save_fails() -> KnownDefect {
    KnownDefect::new(&[INTERNAL_SERVER_ERROR], "saving an education intermittently answers 500")
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let year = current_year();
    let base = payload("Test", 1, "CS", year - 1, year);
    let education = |label: &str, expected: &[u16]| TestCase::new(label, expected).payload(base.clone());

    let mut cases = vec![TestCase::new("valid_basic", &[OK]).payload(seed()).known_defect(save_fails())];
    cases.extend(auth_cases(|label, expected| education(label, expected)));
    cases.extend([
        education("empty_institution", VALIDATION).field("institutionName", json!("")),
        education("too_long_institution", VALIDATION).field("institutionName", json!("X".repeat(MAX_INSTITUTION + 1))),
        education("too_long_field_of_study", VALIDATION)
            .field("fieldOfStudy", json!("X".repeat(MAX_FIELD_OF_STUDY + 1))),
        education("null_institution", VALIDATION).field("institutionName", Value::Null),
        education("null_field_of_study", VALIDATION).field("fieldOfStudy", Value::Null),
        TestCase::new("missing_institution", VALIDATION).payload(without(&base, "institutionName")),
        TestCase::new("missing_degree_id", VALIDATION).payload(without(&base, "degreeId")),
        TestCase::new("missing_field_of_study", VALIDATION).payload(without(&base, "fieldOfStudy")),
        education("invalid_degree", VALIDATION).field("degreeId", json!(0)),
        education("future_start_year", VALIDATION)
            .field("startYear", json!(year + 5))
            .field("finishYear", json!(year + 6)),
        education("finish_before_start", VALIDATION)
            .field("startYear", json!(year))
            .field("finishYear", json!(year - 1)),
        TestCase::new("start_year_min", SAVED_OR_REJECTED)
            .payload(payload("Boundary Case", 1, "History", 1900, 1901))
            .known_defect(save_fails()),
        TestCase::new("finish_year_now", SAVED_OR_REJECTED)
            .payload(payload("Boundary Case", 1, "Physics", year - 1, year))
            .known_defect(save_fails()),
    ]);
    cases
}

fn without(payload: &Value, field: &str) -> Value {
    let mut payload = payload.clone();
    if let Value::Object(map) = &mut payload {
        map.remove(field);
    }
    payload
}

pub fn shape() -> Shape {
    Shape::Object(Schema::new([
        FieldRule::required("id", [FieldType::Integer]),
        FieldRule::required("teacherId", [FieldType::Integer]),
        FieldRule::optional("institutionName", [FieldType::Text]),
        FieldRule::optional("degreeId", [FieldType::Integer]),
        FieldRule::optional("fieldOfStudy", [FieldType::Text]),
        FieldRule::optional("startYear", [FieldType::Integer]),
        FieldRule::optional("finishYear", [FieldType::Integer]),
        FieldRule::optional("createdAt", [FieldType::Text]),
        FieldRule::optional("updatedAt", [FieldType::Text]),
        // The backend sends `null` instead of an empty list.
        FieldRule::optional(
            "documents",
            [FieldType::List(Box::new(FieldType::Object(teacher_documents::document())))],
        ),
    ]))
}

/// Years are ordered and not in the future; a sent institution is echoed.
pub fn education_rules(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    let start = outcome.field("startYear").and_then(numeric);
    let finish = outcome.field("finishYear").and_then(numeric);
    if let Some(start) = start {
        if start > current_year() as f64 {
            violations.push(format!("`startYear` {start} is in the future"));
        }
    }
    if let (Some(start), Some(finish)) = (start, finish) {
        if finish < start {
            violations.push(format!("`finishYear` {finish} is before `startYear` {start}"));
        }
    }
    if let Some(sent @ Value::String(_)) = case.payload_field("institutionName") {
        let echoed = outcome.field("institutionName").unwrap_or(&Value::Null);
        if echoed != sent {
            violations.push(format!("`institutionName` echoed as {echoed}, sent {sent}"));
        }
    }
    violations
}
