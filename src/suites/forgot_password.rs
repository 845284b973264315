//! `POST auth/forgot-password` (public).
//!
//! The happy path needs a registered user and lives in
//! `scenarios::passwords`; this table covers the refusals.

use serde_json::{Value, json};

use crate::auth::AuthMode;
use crate::environment::{HarnessConfig, Resource};
use crate::fake;
use crate::http::negotiation::ContentTypeMode;
use crate::testing::case::{BAD_REQUEST, NOT_FOUND, OK, TestCase, UNPROCESSABLE_ENTITY, UNSUPPORTED_MEDIA_TYPE};
use crate::testing::runner::{Operation, Suite};

use super::VALIDATION;

/// An unknown address may be answered as if it existed.
const UNKNOWN_EMAIL: &[u16] = &[OK, NOT_FOUND, UNPROCESSABLE_ENTITY];

pub fn suite() -> Suite {
    Suite {
        name: "forgot_password",
        resource: Resource::ForgotPassword,
        operation: Operation::Create,
        protected: false,
        check_options: false,
        cases,
        shape: None,
        invariant: None,
        seed: None,
    }
}

fn forgot(label: &str, expected: &[u16], email: Value) -> TestCase {
    TestCase::new(label, expected).auth(AuthMode::None).field("email", email)
}

pub fn cases(config: &HarnessConfig) -> Vec<TestCase> {
    let unknown = fake::email(config.run_label());
    vec![
        forgot("unknown_email", UNKNOWN_EMAIL, json!(unknown)),
        forgot("email_malformed", VALIDATION, json!("test@.com")),
        forgot("email_empty", VALIDATION, json!("")),
        TestCase::new("email_missing", VALIDATION).auth(AuthMode::None),
        forgot("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST], json!(unknown))
            .content_type(ContentTypeMode::TextPlain),
    ]
}
