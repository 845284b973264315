//! `POST UserLanguages`.
//!
//! A repeated POST for the same `languageId` is an upsert, so valid cases
//! each take their own free language id.

use std::collections::BTreeSet;

use serde_json::{Map, Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::fake;
use crate::http::response::ResponseOutcome;
use crate::testing::case::{CREATED, KnownDefect, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{VALIDATION, auth_cases};

const SAVED: &[u16] = &[OK, CREATED];
/// Language ids the backend ships with.
pub const LANGUAGE_POOL: std::ops::RangeInclusive<i64> = 1..=50;

pub fn suite() -> Suite {
    Suite {
        name: "user_languages",
        resource: Resource::UserLanguages,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(saved_as_sent),
        seed: None,
    }
}

/// Create payload. `goal_id: None` leaves `goalId` out entirely.
pub fn payload(language_id: i64, is_target: Value, level: &str, goal_id: Option<i64>, subgoal_id: i64) -> Value {
    let mut body = Map::new();
    body.insert("id".into(), json!(0));
    body.insert("languageId".into(), json!(language_id));
    body.insert("isTarget".into(), is_target);
    body.insert("level".into(), json!(level));
    if let Some(goal_id) = goal_id {
        body.insert("goalId".into(), json!(goal_id));
    }
    body.insert("subgoalId".into(), json!(subgoal_id));
    Value::Object(body)
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let mut used = BTreeSet::new();
    let mut next_language = || {
        let id = fake::free_id(&used, LANGUAGE_POOL);
        used.insert(id);
        id
    };

    let mut cases = vec![
        TestCase::new("valid_minimal", SAVED).payload(payload(next_language(), json!(false), "", Some(0), 1)),
        TestCase::new("valid_with_level", SAVED).payload(payload(next_language(), json!(false), "B2", Some(1), 1)),
        TestCase::new("valid_target_with_goal", SAVED).payload(payload(next_language(), json!(true), "B1", Some(5), 2)),
        TestCase::new("valid_target_without_goal", SAVED).payload(payload(next_language(), json!(true), "B2", None, 1)),
    ];
    let spare = next_language();
    cases.extend(auth_cases(|label, expected| {
        TestCase::new(label, expected).payload(payload(spare, json!(false), "A1", Some(1), 1))
    }));
    cases.extend([
        TestCase::new("invalid_language_id_zero", VALIDATION).payload(payload(0, json!(false), "A1", Some(1), 1)),
        TestCase::new("invalid_is_target_null", VALIDATION).payload(payload(1, Value::Null, "A1", Some(1), 1)),
        TestCase::new("invalid_level_outside", VALIDATION).payload(payload(1, json!(false), "Z9", Some(1), 1)),
        TestCase::new("invalid_target_goal_id_zero", VALIDATION)
            .payload(payload(1, json!(true), "B1", Some(0), 1))
            .known_defect(KnownDefect::new(SAVED, "accepts goalId=0 with isTarget=true")),
        TestCase::new("invalid_subgoal_id_zero", VALIDATION).payload(payload(1, json!(false), "A2", Some(1), 0)),
    ]);
    cases
}

pub fn shape() -> Shape {
    let id = || vec![FieldType::Integer, FieldType::Text];
    Shape::Object(Schema::new([
        FieldRule::required("id", id()),
        FieldRule::required("languageId", id()),
        FieldRule::optional("isTarget", [FieldType::Boolean]),
        FieldRule::optional("level", [FieldType::Text]),
        FieldRule::optional("goalId", [FieldType::Integer]),
        FieldRule::optional("subgoalId", [FieldType::Integer]),
    ]))
}

/// The record got a real id and kept the language and target flag.
pub fn saved_as_sent(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    match outcome.field("id") {
        None | Some(Value::Null) => violations.push("record has no `id`".to_string()),
        Some(id) if id == &json!(0) || id == &json!("0") => violations.push("record id is 0".to_string()),
        Some(_) => {}
    }

    let sent = case.payload_field("languageId").and_then(Value::as_i64);
    let echoed = outcome.field("languageId").and_then(|id| match id {
        Value::String(text) => text.parse::<i64>().ok(),
        other => other.as_i64(),
    });
    if sent.is_some() && sent != echoed {
        violations.push(format!("languageId echoed as {echoed:?}, sent {sent:?}"));
    }

    if case.payload_field("isTarget") == Some(&Value::Bool(true)) {
        if let Some(flag) = outcome.field("isTarget") {
            if flag != &Value::Bool(true) {
                violations.push(format!("isTarget echoed as {flag}"));
            }
        }
    }
    violations
}
