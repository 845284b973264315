//! `DELETE LearningMaterials/{id}`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::testing::case::{NO_CONTENT, OK, TestCase};
use crate::testing::runner::{Operation, Suite};

use super::{BOUNDARY_ID, MISSING_ID, auth_cases, boundary_id_cases, learning_materials};

pub fn suite() -> Suite {
    Suite {
        name: "learning_material_delete",
        resource: Resource::LearningMaterials,
        operation: Operation::Terminate,
        protected: true,
        check_options: false,
        cases,
        shape: None,
        invariant: None,
        seed: Some(learning_materials::seed),
    }
}

fn remove(label: &str, expected: &[u16], id: Value) -> TestCase {
    TestCase::new(label, expected).path_param(id)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![TestCase::new("own_material", &[OK, NO_CONTENT])];
    cases.extend(auth_cases(|label, expected| remove(label, expected, json!(1))));
    cases.push(remove("id_unknown", MISSING_ID, json!(999_999)));
    cases.extend(boundary_id_cases(remove, BOUNDARY_ID));
    cases
}
