//! `POST favoriteteachers`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::{AcceptMode, ContentTypeMode};
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, CREATED, NO_CONTENT, NOT_ACCEPTABLE, NOT_FOUND, OK, TestCase, UNPROCESSABLE_ENTITY,
    UNSUPPORTED_MEDIA_TYPE,
};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{ABOVE_I32, BOUNDARY_ID, auth_cases};

/// Teachers known to exist on the shared backend.
pub const TEACHER_A: i64 = 1_000_155;
pub const TEACHER_B: i64 = 1_000_144;

/// Adding is not idempotent: a repeat answers 422 `isExists`.
const ADDED: &[u16] = &[OK, CREATED, NO_CONTENT, UNPROCESSABLE_ENTITY];

pub fn suite() -> Suite {
    Suite {
        name: "favorite_teachers",
        resource: Resource::FavoriteTeachers,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: None,
        invariant: None,
        seed: None,
    }
}

fn favorite(label: &str, expected: &[u16], teacher_id: Value) -> TestCase {
    TestCase::new(label, expected).field("teacherId", teacher_id)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![
        favorite("add_teacher_a", ADDED, json!(TEACHER_A)).error_contains("isExists"),
        favorite("add_teacher_b", ADDED, json!(TEACHER_B)).error_contains("isExists"),
    ];
    cases.extend(auth_cases(|label, expected| favorite(label, expected, json!(TEACHER_A))));
    cases.extend([
        favorite("id_zero", BOUNDARY_ID, json!(0)),
        favorite("id_negative", BOUNDARY_ID, json!(-1)),
        favorite("id_huge", BOUNDARY_ID, json!(ABOVE_I32)),
        favorite("id_non_numeric", BOUNDARY_ID, json!("1x")),
        favorite("id_unknown", &[BAD_REQUEST, NOT_FOUND, CONFLICT, UNPROCESSABLE_ENTITY], json!(i32::MAX)),
        TestCase::new("missing_teacher_id", BOUNDARY_ID),
        favorite("accept_text_plain", ADDED, json!(TEACHER_A)).accept(AcceptMode::Text),
        favorite("accept_xml", &[OK, CREATED, NO_CONTENT, NOT_ACCEPTABLE, UNPROCESSABLE_ENTITY], json!(TEACHER_A))
            .accept(AcceptMode::Xml),
        favorite("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST], json!(TEACHER_A))
            .content_type(ContentTypeMode::TextPlain),
    ]);
    cases
}

/// `GET favoriteteachers`: every entry carries its language.
pub fn list_shape() -> Shape {
    let id = || vec![FieldType::Integer, FieldType::Text];
    let language = Schema::new([
        FieldRule::required("id", id()),
        FieldRule::required("languageName", [FieldType::Text]).nullable(true),
        FieldRule::required("languageOwnName", [FieldType::Text]).nullable(true),
    ]);
    Shape::List(Schema::new([
        FieldRule::required("id", id()),
        FieldRule::required("nickname", [FieldType::Text]).nullable(true),
        FieldRule::required("language", [FieldType::Object(language)]),
    ]))
}
