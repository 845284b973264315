//! `GET Accounting/user-account-balance`.

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::AcceptMode;
use crate::http::response::ResponseOutcome;
use crate::testing::case::{NOT_ACCEPTABLE, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{auth_cases, is_currency_code, numeric};

pub fn suite() -> Suite {
    Suite {
        name: "account_balance",
        resource: Resource::AccountBalance,
        operation: Operation::List,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(balance_is_numeric),
        seed: None,
    }
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    negotiation_cases()
}

/// Accept variants shared by the read-only accounting endpoints.
pub(crate) fn negotiation_cases() -> Vec<TestCase> {
    let get = |label: &str, expected: &[u16], accept: AcceptMode| TestCase::new(label, expected).accept(accept);
    let negotiated = &[OK, NOT_ACCEPTABLE];

    let mut cases = vec![
        get("ok_text_plain", &[OK], AcceptMode::Text),
        get("accept_json", negotiated, AcceptMode::Json),
        get("accept_json_charset", negotiated, AcceptMode::JsonCharset),
        get("accept_xml", negotiated, AcceptMode::Xml),
        get("accept_any", &[OK], AcceptMode::Any),
        get("no_accept", &[OK], AcceptMode::Absent),
        get("accept_text_charset", &[OK], AcceptMode::TextCharset),
    ];
    cases.extend(auth_cases(|label, expected| get(label, expected, AcceptMode::Text)));
    cases
}

pub fn shape() -> Shape {
    Shape::Object(Schema::new([
        FieldRule::required("balance", [FieldType::Number]),
        FieldRule::optional("currencyCode", [FieldType::CurrencyCode]),
    ]))
}

pub fn balance_is_numeric(_case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    if outcome.field("balance").and_then(numeric).is_none() {
        violations.push("`balance` is not a number or numeric string".to_string());
    }
    if let Some(code) = outcome.field("currencyCode").and_then(|code| code.as_str()) {
        if !is_currency_code(code) {
            violations.push(format!("`currencyCode` {code:?} is not three upper-case letters"));
        }
    }
    violations
}
