use serde_json::{Value, json};
use tracing::debug;

use crate::auth::Session;
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::http::client::Transport;
use crate::http::response::ResponseOutcome;
use crate::resource::ResourceClient;
use crate::suites::favorite_teachers::{TEACHER_A, TEACHER_B, list_shape};
use crate::testing::case::{CREATED, NO_CONTENT, OK, UNPROCESSABLE_ENTITY};

use super::{ensure, expect_status};

const ADDED: &[u16] = &[OK, CREATED, NO_CONTENT];
const DELETED: &[u16] = &[OK, NO_CONTENT];

/// Favorites of one user, with the tolerances the backend needs.
pub struct FavoritesApi<'t, T: Transport> {
    scenario: &'static str,
    client: ResourceClient<'t, T>,
}

impl<'t, T: Transport> FavoritesApi<'t, T> {
    pub fn new(scenario: &'static str, config: &HarnessConfig, transport: &'t T, session: &Session) -> Self {
        Self {
            scenario,
            client: ResourceClient::for_session(config, transport, Resource::FavoriteTeachers, session),
        }
    }

    pub fn client(&self) -> &ResourceClient<'t, T> {
        &self.client
    }

    pub async fn list(&mut self) -> Result<Vec<Value>, HarnessError> {
        let outcome = self.client.list().await?;
        expect_status(self.scenario, "list favorites", &outcome, &[OK])?;
        match outcome.parsed_body {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None if outcome.raw_body.trim().is_empty() => Ok(Vec::new()),
            _ => Err(HarnessError::scenario(
                self.scenario,
                format!("favorites list is not a JSON array: {:?}", outcome.raw_body),
            )),
        }
    }

    pub async fn list_ids(&mut self) -> Result<Vec<i64>, HarnessError> {
        Ok(self.list().await?.iter().filter_map(teacher_id).collect())
    }

    pub async fn add(&mut self, teacher_id: i64) -> Result<ResponseOutcome, HarnessError> {
        let outcome = self.client.add(json!({ "teacherId": teacher_id })).await?;
        expect_status(self.scenario, "add favorite", &outcome, ADDED)?;
        Ok(outcome)
    }

    /// Like `add`, but a 422 `isExists` is fine.
    pub async fn add_ignore_exists(&mut self, teacher_id: i64) -> Result<ResponseOutcome, HarnessError> {
        let outcome = self.client.add(json!({ "teacherId": teacher_id })).await?;
        if is_tolerated(&outcome, "isExists") {
            return Ok(outcome);
        }
        expect_status(self.scenario, "add favorite", &outcome, ADDED)?;
        Ok(outcome)
    }

    pub async fn delete(&mut self, teacher_id: i64) -> Result<ResponseOutcome, HarnessError> {
        let outcome = self.client.delete(&teacher_id.to_string()).await?;
        expect_status(self.scenario, "delete favorite", &outcome, DELETED)?;
        Ok(outcome)
    }

    /// Like `delete`, but a 422 `notFound` is fine.
    pub async fn delete_ignore_missing(&mut self, teacher_id: i64) -> Result<ResponseOutcome, HarnessError> {
        let outcome = self.client.delete(&teacher_id.to_string()).await?;
        if is_tolerated(&outcome, "notFound") {
            return Ok(outcome);
        }
        expect_status(self.scenario, "delete favorite", &outcome, DELETED)?;
        Ok(outcome)
    }

    pub async fn clear(&mut self) -> Result<(), HarnessError> {
        let ids = self.list_ids().await?;
        debug!(count = ids.len(), "clearing favorites");
        for id in ids {
            self.delete_ignore_missing(id).await?;
        }
        Ok(())
    }
}

fn is_tolerated(outcome: &ResponseOutcome, marker: &str) -> bool {
    outcome.status == UNPROCESSABLE_ENTITY && outcome.raw_body.contains(marker)
}

/// Ids arrive as numbers or numeric strings.
fn teacher_id(item: &Value) -> Option<i64> {
    match item.get("id")? {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_i64(),
    }
}

/// Both added teachers show up in the list.
pub async fn add_and_list<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_add_and_list";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_A).await?;
    api.add(TEACHER_B).await?;
    let ids = api.list_ids().await?;
    ensure(NAME, ids.contains(&TEACHER_A) && ids.contains(&TEACHER_B), || {
        format!("expected {TEACHER_A} and {TEACHER_B} in {ids:?}")
    })
}

/// Every entry of the list carries id, nickname and a language block.
pub async fn list_structure<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_list_structure";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_A).await?;
    let items = api.list().await?;
    ensure(NAME, !items.is_empty(), || "list is empty after adding a teacher".to_string())?;
    let violations = list_shape().validate(&Value::Array(items));
    ensure(NAME, violations.is_empty(), || violations.join("; "))
}

/// Deleting one of two teachers leaves exactly the other.
pub async fn delete_one<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_delete_one";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_A).await?;
    api.add(TEACHER_B).await?;
    api.delete(TEACHER_A).await?;
    let left = api.list_ids().await?;
    ensure(NAME, left == [TEACHER_B], || {
        format!("expected only {TEACHER_B} to remain, got {left:?}")
    })
}

/// A second delete is harmless: 200/204, or 422 `notFound`.
pub async fn double_delete<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_double_delete";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_A).await?;
    api.delete(TEACHER_A).await?;
    let second = api.delete_ignore_missing(TEACHER_A).await?;
    ensure(NAME, second.status != UNPROCESSABLE_ENTITY || second.raw_body.contains("notFound"), || {
        format!("second delete answered 422 without notFound: {:?}", second.raw_body)
    })?;
    let left = api.list_ids().await?;
    ensure(NAME, !left.contains(&TEACHER_A), || format!("{TEACHER_A} still listed: {left:?}"))
}

/// Re-adding a teacher never duplicates it.
pub async fn duplicate_add<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_duplicate_add";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_B).await?;
    api.add_ignore_exists(TEACHER_B).await?;
    let ids = api.list_ids().await?;
    let copies = ids.iter().filter(|&&id| id == TEACHER_B).count();
    ensure(NAME, copies == 1, || format!("expected one {TEACHER_B}, got {ids:?}"))
}

pub async fn clear_removes_all<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "favorites_clear";
    let mut api = FavoritesApi::new(NAME, config, transport, session);
    api.clear().await?;
    api.add(TEACHER_A).await?;
    api.add(TEACHER_B).await?;
    api.clear().await?;
    let left = api.list_ids().await?;
    ensure(NAME, left.is_empty(), || format!("clear left {left:?}"))
}
