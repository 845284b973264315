//! `POST auth/change-password`.
//!
//! Every case sends an old password the session user does not have, so the
//! shared session keeps working. The successful change is
//! `scenarios::passwords::change_password`.

use serde_json::json;

use crate::environment::{HarnessConfig, Resource};
use crate::http::negotiation::ContentTypeMode;
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, GONE, TestCase, UNAUTHORIZED, UNPROCESSABLE_ENTITY, UNSUPPORTED_MEDIA_TYPE,
};
use crate::testing::runner::{Operation, Suite};

use super::{VALIDATION, auth_cases};

const WRONG_OLD_PASSWORD: &str = "Not-The-Passw0rd";
const NEW_PASSWORD: &str = "Changed-Passw0rd";

/// The old password is checked before or after the new one is validated.
const REFUSED: &[u16] = &[BAD_REQUEST, UNAUTHORIZED, CONFLICT, GONE, UNPROCESSABLE_ENTITY];

pub fn suite() -> Suite {
    Suite {
        name: "change_password",
        resource: Resource::ChangePassword,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: None,
        invariant: None,
        seed: None,
    }
}

fn change(label: &str, expected: &[u16]) -> TestCase {
    TestCase::new(label, expected)
        .field("oldPassword", json!(WRONG_OLD_PASSWORD))
        .field("newPassword", json!(NEW_PASSWORD))
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut cases = vec![change("wrong_old_password", &[BAD_REQUEST, UNAUTHORIZED, GONE, UNPROCESSABLE_ENTITY])];
    cases.extend(auth_cases(change));
    cases.extend([
        change("new_password_empty", REFUSED).field("newPassword", json!("")),
        TestCase::new("missing_old_password", VALIDATION).field("newPassword", json!(NEW_PASSWORD)),
        change("content_type_text_plain", &[UNSUPPORTED_MEDIA_TYPE, BAD_REQUEST])
            .content_type(ContentTypeMode::TextPlain),
    ]);
    cases
}
