//! `GET TeacherDocuments`.
//!
//! Uploads are multipart and stay out of the JSON harness; only reads are
//! covered.

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::AcceptMode;
use crate::testing::case::{NOT_ACCEPTABLE, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::auth_cases;

pub fn suite() -> Suite {
    Suite {
        name: "teacher_documents",
        resource: Resource::TeacherDocuments,
        operation: Operation::List,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: None,
        seed: None,
    }
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let get = |label: &str, expected: &[u16], accept: AcceptMode| TestCase::new(label, expected).accept(accept);
    let mut cases = vec![
        get("ok_list", &[OK], AcceptMode::Json),
        get("accept_any", &[OK], AcceptMode::Any),
        get("accept_xml", &[OK, NOT_ACCEPTABLE], AcceptMode::Xml),
    ];
    cases.extend(auth_cases(|label, expected| get(label, expected, AcceptMode::Json)));
    cases
}

pub fn document() -> Schema {
    let mut schema = Schema::new([
        FieldRule::required("id", [FieldType::Integer]),
        FieldRule::required("teacherId", [FieldType::Integer]),
    ]);
    for name in ["documentType", "fileName", "fileUrl", "title", "description"] {
        schema = schema.rule(FieldRule::optional(name, [FieldType::Text]));
    }
    schema
}

pub fn shape() -> Shape {
    Shape::List(document())
}

pub fn item_shape() -> Shape {
    Shape::Object(document())
}
