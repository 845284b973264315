//! `POST Accounting/buy-package`.
//!
//! A fresh user has no funds, so the happy path usually ends in 422
//! `insufficientFunds`; both that and a real purchase are acceptable.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::{AcceptMode, ContentTypeMode};
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, GONE, NOT_ACCEPTABLE, NOT_FOUND, OK, TestCase, UNPROCESSABLE_ENTITY, UNSUPPORTED_MEDIA_TYPE,
};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{ABOVE_I32, auth_cases};

const BAD: &[u16] = &[BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY, GONE];
const INSUFFICIENT_FUNDS: &str = "accounting.user.insufficientFunds";

pub fn suite() -> Suite {
    Suite {
        name: "buy_package",
        resource: Resource::BuyPackage,
        operation: Operation::Create,
        protected: true,
        check_options: true,
        cases,
        shape: Some(shape),
        invariant: None,
        seed: None,
    }
}

fn buy(label: &str, expected: &[u16], package_id: Option<Value>) -> TestCase {
    let case = TestCase::new(label, expected).accept(AcceptMode::Text);
    match package_id {
        Some(id) => case.field("lessonPackageDefinitionId", id),
        None => case,
    }
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![buy(
        "ok_text_accept_id_1",
        &[OK, NOT_FOUND, UNPROCESSABLE_ENTITY, CONFLICT, GONE],
        Some(json!(1)),
    )];
    cases.extend(auth_cases(|label, expected| buy(label, expected, Some(json!(1)))));
    cases.extend([
        buy("missing_id", BAD, None).error_contains("lessonPackageDefinitionId"),
        buy("id_zero", BAD, Some(json!(0))),
        buy("id_negative", BAD, Some(json!(-1))),
        buy("id_string_numeric", &[OK, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY, GONE], Some(json!("1"))),
        buy("id_non_numeric", BAD, Some(json!("1x"))).error_code_contains("validation.failed"),
        buy(
            "id_huge",
            &[BAD_REQUEST, NOT_FOUND, UNPROCESSABLE_ENTITY, CONFLICT],
            Some(json!(ABOVE_I32)),
        ),
        buy("accept_json", &[OK, NOT_ACCEPTABLE, UNPROCESSABLE_ENTITY, GONE], Some(json!(1)))
            .accept(AcceptMode::Json)
            .error_code_contains(INSUFFICIENT_FUNDS),
        buy("accept_any", &[OK, UNPROCESSABLE_ENTITY, GONE], Some(json!(1)))
            .accept(AcceptMode::Any)
            .error_code_contains(INSUFFICIENT_FUNDS),
        buy("no_accept", &[OK, UNPROCESSABLE_ENTITY, GONE], Some(json!(1)))
            .accept(AcceptMode::Absent)
            .error_code_contains(INSUFFICIENT_FUNDS),
        buy("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST], Some(json!(1)))
            .content_type(ContentTypeMode::TextPlain),
    ]);
    cases
}

fn id_types() -> Vec<FieldType> {
    vec![FieldType::Integer, FieldType::Text]
}

pub fn shape() -> Shape {
    let party = || FieldType::Object(Schema::new([FieldRule::optional("id", id_types())]));
    Shape::Object(Schema::new([
        FieldRule::optional("id", id_types()),
        FieldRule::optional("title", [FieldType::Text]),
        FieldRule::optional("description", [FieldType::Text]),
        FieldRule::optional("status", [FieldType::Text]),
        FieldRule::optional("currencyCode", [FieldType::Text]),
        FieldRule::optional("price", [FieldType::Number]),
        FieldRule::optional("platformFee", [FieldType::Number]),
        FieldRule::optional("createdAt", [FieldType::Text]),
        FieldRule::optional("updatedAt", [FieldType::Text]),
        FieldRule::optional("teacher", [party()]),
        FieldRule::optional("user", [party()]),
    ]))
}
