use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::auth::Session;
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::fake;
use crate::http::client::Transport;
use crate::resource::ResourceClient;
use crate::suites::user_languages::{LANGUAGE_POOL, payload};
use crate::testing::case::{CREATED, OK};

use super::{ensure, expect_status};

fn record_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn language_id(value: &Value) -> Option<i64> {
    match value.get("languageId")? {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_i64(),
    }
}

/// Posting the same language twice updates the one record.
pub async fn upsert<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "user_language_upsert";
    let mut client = ResourceClient::for_session(config, transport, Resource::UserLanguages, session);

    let listed = client.list().await?;
    expect_status(NAME, "list languages", &listed, &[OK])?;
    let used: BTreeSet<i64> = match &listed.parsed_body {
        Some(Value::Array(items)) => items.iter().filter_map(language_id).collect(),
        _ => BTreeSet::new(),
    };
    let language = fake::free_id(&used, LANGUAGE_POOL);

    let first = client.add(payload(language, json!(false), "A1", Some(1), 1)).await?;
    expect_status(NAME, "first save", &first, &[OK, CREATED])?;
    let second = client.add(payload(language, json!(false), "B2", Some(1), 1)).await?;
    expect_status(NAME, "second save", &second, &[OK, CREATED])?;

    let first_id = first.parsed_body.as_ref().and_then(record_id);
    let second_id = second.parsed_body.as_ref().and_then(record_id);
    ensure(NAME, first_id.is_some() && first_id == second_id, || {
        format!("second save created {second_id:?}, first was {first_id:?}")
    })?;
    ensure(NAME, second.field("level") != Some(&json!("A1")), || "level was not updated".to_string())
}
