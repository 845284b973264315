use serde_json::{Value, json};

use crate::auth::session::public_headers;
use crate::auth::{Credentials, Session, establish_session_with};
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::http::client::Transport;
use crate::testing::case::{CONFLICT, CREATED, OK};

use super::{ensure, expect_status};

/// Too many signups for one address.
const TOO_MANY_REQUESTS: u16 = 429;

/// Signup, set-password and login for a brand new user.
pub async fn login_flow<T: Transport>(config: &HarnessConfig, transport: &T) -> Result<Session, HarnessError> {
    const NAME: &str = "login_flow";
    let credentials = Credentials::generate(config.run_label());
    let session = establish_session_with(config, transport, credentials).await?;
    ensure(NAME, session.token.as_str().len() > 10, || {
        format!("login token too short: {:?}", session.token.as_str())
    })?;
    Ok(session)
}

/// Registering the same email twice is refused.
pub async fn duplicate_signup<T: Transport>(config: &HarnessConfig, transport: &T) -> Result<(), HarnessError> {
    const NAME: &str = "duplicate_signup";
    let headers = public_headers();

    let email = crate::fake::email(config.run_label());
    let url = config.url(Resource::Signup);
    let first = transport.post(Some(json!({ "email": email, "lang": "en" })), &url, &headers).await?;
    expect_status(NAME, "first signup", &first, &[OK, CREATED])?;
    ensure(NAME, first.field("token").and_then(Value::as_str).is_some_and(|token| !token.is_empty()), || {
        format!("first signup returned no token: {:?}", first.raw_body)
    })?;

    let second = transport.post(Some(json!({ "email": email, "lang": "en" })), &url, &headers).await?;
    expect_status(NAME, "second signup", &second, &[TOO_MANY_REQUESTS, CONFLICT])
}
