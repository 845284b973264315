//! `GET TeacherEducations/{id}`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::testing::case::{OK, TestCase};
use crate::testing::runner::{Operation, Suite};

use super::teacher_educations::{NOT_FOUND_CODE, education_rules, seed, shape};
use super::{BOUNDARY_ID, MISSING_ID, auth_cases, boundary_id_cases};

pub fn suite() -> Suite {
    Suite {
        name: "teacher_education_by_id",
        resource: Resource::TeacherEducations,
        operation: Operation::Fetch,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(education_rules),
        seed: Some(seed),
    }
}

fn fetch(label: &str, expected: &[u16], id: Value) -> TestCase {
    TestCase::new(label, expected).path_param(id)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![TestCase::new("ok_existing", &[OK])];
    cases.extend(auth_cases(|label, expected| fetch(label, expected, json!(1))));
    cases.push(fetch("not_found", MISSING_ID, json!(999_999)).error_code_contains(NOT_FOUND_CODE));
    cases.extend(boundary_id_cases(fetch, BOUNDARY_ID));
    cases
}
