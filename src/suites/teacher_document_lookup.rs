//! `GET TeacherDocuments/{id}` for ids the session user does not own.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::testing::case::TestCase;
use crate::testing::runner::{Operation, Suite};

use super::{BOUNDARY_ID, MISSING_ID, auth_cases, boundary_id_cases, teacher_documents};

pub fn suite() -> Suite {
    Suite {
        name: "teacher_document_lookup",
        resource: Resource::TeacherDocuments,
        operation: Operation::Fetch,
        protected: true,
        check_options: false,
        cases,
        shape: Some(teacher_documents::item_shape),
        invariant: None,
        seed: None,
    }
}

fn lookup(label: &str, expected: &[u16], id: Value) -> TestCase {
    TestCase::new(label, expected).path_param(id)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = auth_cases(|label, expected| lookup(label, expected, json!(1))).to_vec();
    cases.push(lookup("id_unknown", MISSING_ID, json!(999_999)));
    cases.extend(boundary_id_cases(lookup, BOUNDARY_ID));
    cases
}
