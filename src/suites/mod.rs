//! # Suites
//!
//! One case table per backend endpoint, with the response shape and the
//! business invariants that apply to it.

pub mod account_balance;
pub mod account_transactions;
pub mod buy_package;
pub mod change_password;
pub mod deposit;
pub mod favorite_teachers;
pub mod forgot_password;
pub mod learning_material_delete;
pub mod learning_material_lookup;
pub mod learning_materials;
pub mod profile;
pub mod reset_password;
pub mod signup;
pub mod teacher_document_lookup;
pub mod teacher_documents;
pub mod teacher_education_by_id;
pub mod teacher_education_update;
pub mod teacher_educations;
pub mod teaching_experiences;
pub mod terminate_package;
pub mod user_languages;

use chrono::{Datelike, NaiveDateTime, Utc};
use serde_json::{Value, json};

use crate::auth::AuthMode;
use crate::error::HarnessError;
use crate::testing::case::{
    BAD_REQUEST, CONFLICT, FORBIDDEN, GONE, NOT_FOUND, TestCase, UNAUTHORIZED, UNPROCESSABLE_ENTITY,
};
use crate::testing::runner::Suite;

/// Any refusal of a missing or bogus bearer token.
pub const AUTH_REFUSED: &[u16] = &[UNAUTHORIZED, FORBIDDEN];

/// Validation failures; the backend maps some of them to 409.
pub const VALIDATION: &[u16] = &[BAD_REQUEST, CONFLICT, UNPROCESSABLE_ENTITY];

/// Statuses an out-of-range identifier may produce.
pub const BOUNDARY_ID: &[u16] = &[BAD_REQUEST, NOT_FOUND, CONFLICT, GONE, UNPROCESSABLE_ENTITY];

/// A well-formed id that names no record.
pub const MISSING_ID: &[u16] = &[NOT_FOUND, GONE, UNPROCESSABLE_ENTITY];

/// Largest `i32` plus one; ids this big overflow a 32-bit column.
pub const ABOVE_I32: i64 = i32::MAX as i64 + 1;

pub fn all() -> Vec<Suite> {
    vec![
        signup::suite(),
        forgot_password::suite(),
        reset_password::suite(),
        change_password::suite(),
        profile::suite(),
        deposit::suite(),
        buy_package::suite(),
        account_balance::suite(),
        account_transactions::suite(),
        terminate_package::suite(),
        favorite_teachers::suite(),
        user_languages::suite(),
        learning_materials::suite(),
        learning_material_lookup::suite(),
        learning_material_delete::suite(),
        teacher_educations::suite(),
        teacher_education_by_id::suite(),
        teacher_education_update::suite(),
        teacher_documents::suite(),
        teacher_document_lookup::suite(),
        teaching_experiences::suite(),
    ]
}

pub fn find(name: &str) -> Result<Suite, HarnessError> {
    all()
        .into_iter()
        .find(|suite| suite.name == name)
        .ok_or_else(|| HarnessError::UnknownSuite(name.to_string()))
}

/// `unauthorized` (no header) and `invalid_token` variants of a base case.
fn auth_cases(base: impl Fn(&str, &[u16]) -> TestCase) -> [TestCase; 2] {
    [
        base("unauthorized", AUTH_REFUSED).auth(AuthMode::None),
        base("invalid_token", AUTH_REFUSED).auth(AuthMode::Invalid),
    ]
}

/// A JSON number, or a string holding one.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

/// `YYYY-MM-DDTHH:MM:SS[.f{1,6}]Z` naming a real UTC instant.
pub fn is_iso_timestamp(text: &str) -> bool {
    let Some(stamp) = text.strip_suffix('Z') else {
        return false;
    };
    let (whole, fraction) = match stamp.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (stamp, None),
    };
    if whole.len() != 19 {
        return false;
    }
    if let Some(digits) = fraction {
        if !(1..=6).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// Calendar year in UTC, the upper bound for start and finish years.
pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

/// `id_zero`, `id_negative`, `id_huge` and `id_non_numeric` for an item
/// endpoint, each expecting `expected`.
fn boundary_id_cases(base: impl Fn(&str, &[u16], Value) -> TestCase, expected: &[u16]) -> [TestCase; 4] {
    [
        base("id_zero", expected, json!(0)),
        base("id_negative", expected, json!(-5)),
        base("id_huge", expected, json!(ABOVE_I32)),
        base("id_non_numeric", expected, json!("abc")),
    ]
}

/// Three upper-case ASCII letters.
pub fn is_currency_code(text: &str) -> bool {
    text.len() == 3 && text.bytes().all(|b| b.is_ascii_uppercase())
}
