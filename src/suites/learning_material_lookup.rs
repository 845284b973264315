//! `GET LearningMaterials/{id}`, readable without a token.

use serde_json::{Value, json};

use crate::auth::AuthMode;
use crate::environment::{HarnessConfig, Resource};
use crate::testing::case::{OK, TestCase};
use crate::testing::runner::{Operation, Suite};

use super::{BOUNDARY_ID, MISSING_ID, boundary_id_cases, learning_materials};

pub fn suite() -> Suite {
    Suite {
        name: "learning_material_lookup",
        resource: Resource::LearningMaterials,
        operation: Operation::Fetch,
        protected: false,
        check_options: false,
        cases,
        shape: Some(learning_materials::shape),
        invariant: None,
        seed: Some(learning_materials::seed),
    }
}

fn lookup(label: &str, expected: &[u16], id: Value) -> TestCase {
    TestCase::new(label, expected).auth(AuthMode::None).path_param(id)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![
        TestCase::new("anonymous_existing", &[OK]).auth(AuthMode::None),
        lookup("id_unknown", MISSING_ID, json!(999_999)),
    ];
    cases.extend(boundary_id_cases(lookup, BOUNDARY_ID));
    cases
}
