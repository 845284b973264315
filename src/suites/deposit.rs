//! `POST Accounting/deposit`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::{AcceptMode, ContentTypeMode};
use crate::http::response::ResponseOutcome;
use crate::testing::case::{
    BAD_REQUEST, CREATED, INTERNAL_SERVER_ERROR, KnownDefect, NOT_ACCEPTABLE, OK, TestCase, UNPROCESSABLE_ENTITY,
    UNSUPPORTED_MEDIA_TYPE,
};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{VALIDATION, auth_cases, numeric};

const ACCEPTED: &[u16] = &[OK, CREATED];
const LENIENT: &[u16] = &[OK, BAD_REQUEST, UNPROCESSABLE_ENTITY];

/// Echoed amounts may differ by rounding.
const AMOUNT_TOLERANCE: f64 = 0.01;

pub fn suite() -> Suite {
    Suite {
        name: "deposit",
        resource: Resource::Deposit,
        operation: Operation::Create,
        protected: true,
        check_options: true,
        cases,
        shape: Some(shape),
        invariant: Some(amount_echo),
        seed: None,
    }
}

fn deposit(label: &str, expected: &[u16]) -> TestCase {
    TestCase::new(label, expected)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![
        deposit("ok_minimal", ACCEPTED)
            .field("amount", json!(100))
            .field("description", json!("test")),
        deposit("ok_with_fee", ACCEPTED)
            .field("amount", json!(1000))
            .field("fee", json!(25))
            .field("description", json!("with fee")),
    ];
    cases.extend(auth_cases(|label, expected| deposit(label, expected).field("amount", json!(100))));
    cases.extend([
        deposit("bad_negative_amount", VALIDATION)
            .field("amount", json!(-50))
            .error_contains("amount")
            .error_code_contains("lessZero"),
        deposit("bad_missing_amount", VALIDATION).error_contains("amount"),
        deposit("amount_zero", VALIDATION)
            .field("amount", json!(0))
            .error_contains("amount"),
        deposit("amount_non_numeric", VALIDATION)
            .field("amount", json!("100x"))
            .error_code_contains("validation.failed"),
        deposit("amount_decimal3", LENIENT).field("amount", json!(100.001)),
        deposit("amount_huge", LENIENT)
            .field("amount", json!(1_000_000_000_000_i64))
            .known_defect(KnownDefect::new(
                &[INTERNAL_SERVER_ERROR],
                "500 on huge amount (DB save error)",
            )),
        deposit("fee_negative", VALIDATION)
            .field("amount", json!(200))
            .field("fee", json!(-5))
            .error_contains("fee"),
        deposit("fee_non_numeric", VALIDATION)
            .field("amount", json!(200))
            .field("fee", json!("10x"))
            .error_code_contains("validation.failed"),
        deposit("fee_missing", LENIENT).field("amount", json!(200)),
        deposit("desc_long", VALIDATION)
            .field("amount", json!(200))
            .field("description", json!("A".repeat(600))),
        deposit("desc_html", LENIENT)
            .field("amount", json!(200))
            .field("description", json!("<script>alert(1)</script>")),
        deposit("accept_xml", &[OK, NOT_ACCEPTABLE])
            .field("amount", json!(200))
            .accept(AcceptMode::Xml),
        deposit("accept_any", ACCEPTED)
            .field("amount", json!(200))
            .accept(AcceptMode::Any),
        deposit("accept_text_plain", ACCEPTED)
            .field("amount", json!(200))
            .accept(AcceptMode::Text),
        deposit("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST])
            .field("amount", json!(200))
            .content_type(ContentTypeMode::TextPlain),
    ]);
    cases
}

pub fn shape() -> Shape {
    Shape::Object(Schema::new([
        FieldRule::optional("amount", [FieldType::Number]),
        FieldRule::optional("feeAmount", [FieldType::Number]),
        FieldRule::optional("currencyCode", [FieldType::CurrencyCode]),
    ]))
}

/// A numeric `amount` (and `fee`, when echoed as `feeAmount`) comes back unchanged.
pub fn amount_echo(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    if let Some(sent) = case.payload_field("amount").and_then(Value::as_f64) {
        match outcome.field("amount").and_then(numeric) {
            Some(echoed) if (echoed - sent).abs() <= AMOUNT_TOLERANCE => {}
            Some(echoed) => violations.push(format!("amount echoed as {echoed}, sent {sent}")),
            None => violations.push("response has no numeric `amount`".to_string()),
        }
    }
    if let Some(sent) = case.payload_field("fee").and_then(Value::as_f64) {
        if let Some(echoed) = outcome.field("feeAmount").and_then(numeric) {
            if (echoed - sent).abs() > AMOUNT_TOLERANCE {
                violations.push(format!("feeAmount echoed as {echoed}, sent {sent}"));
            }
        }
    }
    violations
}
