//! `POST auth/reset-password` (public) with tokens that were never issued.

use serde_json::{Value, json};

use crate::auth::{AuthMode, SESSION_TIMEZONE};
use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::ContentTypeMode;
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, GONE, NOT_FOUND, TestCase, UNPROCESSABLE_ENTITY, UNSUPPORTED_MEDIA_TYPE,
};
use crate::testing::runner::{Operation, Suite};

use super::VALIDATION;

/// A token the backend never issued, or one that expired.
const BAD_TOKEN: &[u16] = &[BAD_REQUEST, NOT_FOUND, CONFLICT, GONE, UNPROCESSABLE_ENTITY];

const NEW_PASSWORD: &str = "Reset-Passw0rd";

pub fn suite() -> Suite {
    Suite {
        name: "reset_password",
        resource: Resource::ResetPassword,
        operation: Operation::Create,
        protected: false,
        check_options: false,
        cases,
        shape: None,
        invariant: None,
        seed: None,
    }
}

fn reset(label: &str, expected: &[u16], token: Value) -> TestCase {
    TestCase::new(label, expected)
        .auth(AuthMode::None)
        .field("token", token)
        .field("newPassword", json!(NEW_PASSWORD))
        .field("timezone", json!(SESSION_TIMEZONE))
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    vec![
        reset("token_unknown", BAD_TOKEN, json!("never-issued-reset-token")),
        reset("token_empty", VALIDATION, json!("")),
        TestCase::new("token_missing", VALIDATION)
            .auth(AuthMode::None)
            .field("newPassword", json!(NEW_PASSWORD)),
        reset("password_empty", BAD_TOKEN, json!("never-issued-reset-token")).field("newPassword", json!("")),
        reset("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST], json!("never-issued-reset-token"))
            .content_type(ContentTypeMode::TextPlain),
    ]
}
