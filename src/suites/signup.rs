//! `POST auth/signup` (public).

use serde_json::{Value, json};

use crate::auth::AuthMode;
use crate::environment::{HarnessConfig, Resource};
use crate::fake;
use crate::http::negotiation::ContentTypeMode;
use crate::http::response::ResponseOutcome;
use crate::testing::case::{BAD_REQUEST, CONFLICT, CREATED, GONE, OK, TestCase, UNPROCESSABLE_ENTITY, UNSUPPORTED_MEDIA_TYPE};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

const REGISTERED: &[u16] = &[OK, CREATED];
const BAD_EMAIL: &[u16] = &[BAD_REQUEST, CONFLICT, GONE, UNPROCESSABLE_ENTITY];
/// The backend falls back to a default language, so odd values may pass.
const ODD_LANGUAGE: &[u16] = &[OK, CREATED, BAD_REQUEST, CONFLICT, GONE, UNPROCESSABLE_ENTITY];

const XSS: &str = "<script>alert('xss')</script>";
const FORBIDDEN_EMAIL_CHARS: &str = "!#$%^&*()=}{[]|\\:;\"'<>?/";

pub fn suite() -> Suite {
    Suite {
        name: "signup",
        resource: Resource::Signup,
        operation: Operation::Create,
        protected: false,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(echoes_input),
        seed: None,
    }
}

fn signup(label: &str, expected: &[u16], email: impl Into<String>, lang: Value) -> TestCase {
    TestCase::new(label, expected)
        .auth(AuthMode::None)
        .field("email", json!(email.into()))
        .field("lang", lang)
}

pub fn cases(config: &HarnessConfig) -> Vec<TestCase> {
    let label = config.run_label();
    let fresh = || fake::email(label);
    let long_local: String = "a".repeat(250);

    vec![
        signup("valid", REGISTERED, fresh(), json!("en")),
        signup("email_invalid_chars", BAD_EMAIL, format!("{label}{FORBIDDEN_EMAIL_CHARS}@gmail.com"), json!("en")),
        signup("email_empty", BAD_EMAIL, "", json!("en")),
        signup("email_long", BAD_EMAIL, format!("{label}{long_local}@gmail.com"), json!("en")),
        signup("email_malformed", BAD_EMAIL, "test@.com", json!("en")),
        signup("email_xss", BAD_EMAIL, XSS, json!("en")),
        signup("lang_empty", ODD_LANGUAGE, fresh(), json!("")),
        signup("lang_invalid", ODD_LANGUAGE, fresh(), json!("xx")),
        signup("lang_long", ODD_LANGUAGE, fresh(), json!("a".repeat(100))),
        signup("lang_null", ODD_LANGUAGE, fresh(), Value::Null),
        signup("lang_xss", ODD_LANGUAGE, fresh(), json!(XSS)),
        signup("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST], fresh(), json!("en"))
            .content_type(ContentTypeMode::TextPlain),
    ]
}

pub fn shape() -> Shape {
    Shape::Object(Schema::new([
        FieldRule::optional("email", [FieldType::Text]),
        FieldRule::optional("lang", [FieldType::Text]),
        FieldRule::optional("token", [FieldType::Text]),
    ]))
}

/// A registered user comes back with the email and language that were sent.
pub fn echoes_input(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    for name in ["email", "lang"] {
        let sent = case.payload_field(name);
        match (sent, outcome.field(name)) {
            (Some(sent @ Value::String(_)), Some(echoed)) if echoed != sent => {
                violations.push(format!("`{name}` echoed as {echoed}, sent {sent}"));
            }
            _ => {}
        }
    }
    violations
}
