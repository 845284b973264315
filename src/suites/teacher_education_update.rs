//! `PUT TeacherEducations/{id}`.
//!
//! Validation cases address the seeded education so a refusal can only come
//! from the payload.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::testing::case::{BAD_REQUEST, CONFLICT, OK, TestCase, UNPROCESSABLE_ENTITY};
use crate::testing::runner::{Operation, Suite};

use super::teacher_educations::{NOT_FOUND_CODE, education_rules, payload, seed, shape};
use super::{BOUNDARY_ID, MISSING_ID, VALIDATION, auth_cases, boundary_id_cases, current_year};

const LONG_TEXT: usize = 256;

pub fn suite() -> Suite {
    Suite {
        name: "teacher_education_update",
        resource: Resource::TeacherEducations,
        operation: Operation::Replace,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(education_rules),
        seed: Some(seed),
    }
}

fn update_payload() -> Value {
    let year = current_year();
    payload("MIPT", 2, "Applied Math", year - 6, year - 2)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let year = current_year();
    let seeded = |label: &str, expected: &[u16]| TestCase::new(label, expected).payload(update_payload());
    let addressed = |label: &str, expected: &[u16], id: Value| seeded(label, expected).path_param(id);

    let mut cases = vec![seeded("ok_update_existing", &[OK])];
    cases.extend(auth_cases(|label, expected| addressed(label, expected, json!(1))));
    cases.push(addressed("not_found", MISSING_ID, json!(999_999)).error_code_contains(NOT_FOUND_CODE));
    cases.extend(boundary_id_cases(addressed, BOUNDARY_ID));
    cases.extend([
        seeded("empty_institution", VALIDATION).field("institutionName", json!("")),
        seeded("too_long_institution", VALIDATION).field("institutionName", json!("X".repeat(LONG_TEXT))),
        seeded("null_institution", VALIDATION).field("institutionName", Value::Null),
        seeded("too_long_field_of_study", VALIDATION).field("fieldOfStudy", json!("X".repeat(LONG_TEXT))),
        seeded("null_field_of_study", VALIDATION).field("fieldOfStudy", Value::Null),
        seeded("invalid_degree", VALIDATION).field("degreeId", json!(10_000)),
        seeded("future_start_year", VALIDATION)
            .field("startYear", json!(year + 1))
            .field("finishYear", json!(year + 2)),
        seeded("finish_before_start", VALIDATION)
            .field("startYear", json!(2020))
            .field("finishYear", json!(2010)),
        seeded("partial_nullables", &[OK, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY])
            .field("degreeId", Value::Null)
            .field("finishYear", Value::Null),
    ]);
    cases
}
