//! Learning material lifecycle as the material's author.

use serde_json::{Value, json};

use crate::auth::Session;
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::http::client::Transport;
use crate::http::negotiation::AcceptMode;
use crate::http::request::Headers;
use crate::resource::ResourceClient;
use crate::suites::AUTH_REFUSED;
use crate::suites::learning_materials::{TITLE, seed};
use crate::testing::case::{CREATED, GONE, NO_CONTENT, NOT_FOUND, OK, UNPROCESSABLE_ENTITY, render_segment};

use super::{ensure, expect_status};

const UPDATED_TITLE: &str = "Contract test material, revised";

async fn create<T: Transport>(
    name: &'static str,
    client: &mut ResourceClient<'_, T>,
) -> Result<String, HarnessError> {
    let created = client.add(seed()).await?;
    expect_status(name, "add material", &created, &[OK, CREATED])?;
    created
        .field("id")
        .filter(|id| !id.is_null())
        .map(render_segment)
        .ok_or_else(|| HarnessError::scenario(name, format!("saved material has no id: {:?}", created.raw_body)))
}

fn title_is(name: &'static str, step: &str, body: Option<&Value>, expected: &str) -> Result<(), HarnessError> {
    let title = body.and_then(|body| body.get("title"));
    ensure(name, title == Some(&json!(expected)), || {
        format!("{step}: title is {title:?}, expected {expected:?}")
    })
}

/// Add, read back, update, delete, then the material is gone.
pub async fn round_trip<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "learning_material_round_trip";
    let mut client = ResourceClient::for_session(config, transport, Resource::LearningMaterials, session);
    let id = create(NAME, &mut client).await?;

    let fetched = client.get(&id).await?;
    expect_status(NAME, "get material", &fetched, &[OK])?;
    title_is(NAME, "get material", fetched.parsed_body.as_ref(), TITLE)?;

    let mut revised = seed();
    revised["title"] = json!(UPDATED_TITLE);
    let updated = client.update(&id, revised).await?;
    expect_status(NAME, "update material", &updated, &[OK, NO_CONTENT])?;
    let refetched = client.get(&id).await?;
    expect_status(NAME, "get updated material", &refetched, &[OK])?;
    title_is(NAME, "get updated material", refetched.parsed_body.as_ref(), UPDATED_TITLE)?;

    let deleted = client.delete(&id).await?;
    expect_status(NAME, "delete material", &deleted, &[OK, NO_CONTENT])?;
    let gone = client.get(&id).await?;
    expect_status(NAME, "get deleted material", &gone, &[NOT_FOUND, GONE, UNPROCESSABLE_ENTITY])
}

/// Without a token nobody can delete a material, and it stays readable.
pub async fn anonymous_delete<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    session: &Session,
) -> Result<(), HarnessError> {
    const NAME: &str = "learning_material_anonymous_delete";
    let mut owner = ResourceClient::for_session(config, transport, Resource::LearningMaterials, session);
    let id = create(NAME, &mut owner).await?;

    let mut headers = Headers::new();
    AcceptMode::Json.apply(&mut headers);
    let mut anonymous = ResourceClient::new(transport, config.url(Resource::LearningMaterials), headers);
    let refused = anonymous.delete(&id).await?;
    expect_status(NAME, "anonymous delete", &refused, AUTH_REFUSED)?;

    let still_there = anonymous.get(&id).await?;
    expect_status(NAME, "get after anonymous delete", &still_there, &[OK])?;
    let cleanup = owner.delete(&id).await?;
    expect_status(NAME, "owner delete", &cleanup, &[OK, NO_CONTENT])
}
