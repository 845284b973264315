//! `DELETE Accounting/terminate-package/{id}`.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::AcceptMode;
use crate::http::response::ResponseOutcome;
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, GONE, INTERNAL_SERVER_ERROR, KnownDefect, NOT_ACCEPTABLE, NOT_FOUND, OK, TestCase,
    UNPROCESSABLE_ENTITY,
};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{auth_cases, is_currency_code, is_iso_timestamp, numeric};

const SETTLED: &[u16] = &[OK, NOT_FOUND, GONE];
const NEGOTIATED: &[u16] = &[OK, NOT_ACCEPTABLE, NOT_FOUND, GONE];
const REJECTED_ID: &[u16] = &[BAD_REQUEST, NOT_FOUND, CONFLICT, GONE, UNPROCESSABLE_ENTITY];

fn transaction_mismatch() -> KnownDefect {
    KnownDefect::new(
        &[INTERNAL_SERVER_ERROR],
        "500 on terminate-package: original transaction/account mismatch is not mapped to 4xx",
    )
}

pub fn suite() -> Suite {
    Suite {
        name: "terminate_package",
        resource: Resource::TerminatePackage,
        operation: Operation::Terminate,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(package_rules),
        seed: None,
    }
}

fn terminate(label: &str, expected: &[u16], id: Value) -> TestCase {
    TestCase::new(label, expected).path_param(id).accept(AcceptMode::Text)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let package = |label: &str, expected: &[u16], accept: AcceptMode| {
        terminate(label, expected, json!(1))
            .accept(accept)
            .known_defect(transaction_mismatch())
    };

    let mut cases = vec![
        package("ok_text_id_1", SETTLED, AcceptMode::Text),
        package("accept_json", NEGOTIATED, AcceptMode::Json),
        package("accept_json_charset", NEGOTIATED, AcceptMode::JsonCharset),
        package("accept_xml", NEGOTIATED, AcceptMode::Xml),
        package("accept_any", SETTLED, AcceptMode::Any),
        package("accept_text_charset", SETTLED, AcceptMode::TextCharset),
        package("no_accept", SETTLED, AcceptMode::Absent),
    ];
    cases.extend(auth_cases(|label, expected| terminate(label, expected, json!(1))));
    cases.extend([
        terminate("id_zero", REJECTED_ID, json!(0)),
        terminate("id_negative", REJECTED_ID, json!(-1)),
        terminate(
            "id_string_numeric",
            &[OK, NOT_FOUND, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY, GONE],
            json!("1"),
        )
        .known_defect(transaction_mismatch()),
        terminate("id_non_numeric", &[NOT_FOUND, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY], json!("1x"))
            .error_code_contains("validation"),
        terminate("id_huge", &[NOT_FOUND, BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY], json!(super::ABOVE_I32)),
        package("already_terminated", &[OK, CONFLICT, UNPROCESSABLE_ENTITY, GONE], AcceptMode::Text),
    ]);
    cases
}

pub fn shape() -> Shape {
    let id = || vec![FieldType::Integer, FieldType::Text];
    let text = || vec![FieldType::Text];
    let language = Schema::new([
        FieldRule::optional("languageName", text()),
        FieldRule::optional("languageOwnerName", text()),
        FieldRule::optional("shortName2", text()),
        FieldRule::optional("shortName3", text()),
    ]);
    let teacher = Schema::new([
        FieldRule::optional("id", id()),
        FieldRule::optional("nickname", text()),
        FieldRule::optional("avatarUrl", text()),
        FieldRule::optional("profilePicture", text()),
        FieldRule::optional("language", [FieldType::Object(language)]),
    ]);

    let mut schema = Schema::default();
    for name in ["id", "studentId", "teacherId", "packageDefId", "lessonDuration", "lessonsRemaining"] {
        schema = schema.rule(FieldRule::optional(name, id()));
    }
    for name in ["title", "description", "status", "currencyCode", "createdAt", "updatedAt"] {
        schema = schema.rule(FieldRule::optional(name, text()));
    }
    for name in ["price", "platformFee"] {
        schema = schema.rule(FieldRule::optional(name, [FieldType::Number]));
    }
    Shape::Object(schema.rule(FieldRule::optional("teacher", [FieldType::Object(teacher)])))
}

pub fn package_rules(_case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    for name in ["createdAt", "updatedAt"] {
        if let Some(text) = outcome.field(name).and_then(Value::as_str) {
            if !is_iso_timestamp(text) {
                violations.push(format!("`{name}` is not ISO-8601: {text:?}"));
            }
        }
    }
    if let Some(code) = outcome.field("currencyCode").and_then(Value::as_str) {
        if !is_currency_code(code) {
            violations.push(format!("`currencyCode` must be three upper-case letters: {code:?}"));
        }
    }
    if outcome.field("lessonsRemaining").and_then(numeric).is_some_and(|left| left < 0.0) {
        violations.push("`lessonsRemaining` is negative".to_string());
    }
    if let Some(price) = outcome.field("price").filter(|price| !price.is_null()) {
        if numeric(price).is_none() {
            violations.push(format!("`price` is not numeric: {price}"));
        }
    }
    violations
}
