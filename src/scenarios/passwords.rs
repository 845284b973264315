//! Password recovery and change for a user of its own, so the shared
//! session is never touched.

use serde_json::{Value, json};

use crate::auth::session::public_headers;
use crate::auth::{Credentials, SESSION_TIMEZONE, Session, establish_session_with};
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::fake;
use crate::http::client::Transport;
use crate::http::response::ResponseOutcome;
use crate::resource::ResourceClient;
use crate::testing::case::{BAD_REQUEST, CONFLICT, NO_CONTENT, NOT_FOUND, OK, UNAUTHORIZED, UNPROCESSABLE_ENTITY};

use super::{ensure, expect_status};

/// Statuses a login with a stale password may get.
const LOGIN_REFUSED: &[u16] = &[BAD_REQUEST, UNAUTHORIZED, NOT_FOUND, CONFLICT, UNPROCESSABLE_ENTITY];

async fn login<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    email: &str,
    password: &str,
) -> Result<ResponseOutcome, HarnessError> {
    let body = json!({ "email": email, "password": password, "timezone": SESSION_TIMEZONE });
    transport
        .post(Some(body), &config.url(Resource::Login), &public_headers())
        .await
}

/// The new password logs in and the old one no longer does.
async fn only_new_password_works<T: Transport>(
    name: &'static str,
    config: &HarnessConfig,
    transport: &T,
    session: &Session,
    new_password: &str,
) -> Result<(), HarnessError> {
    let fresh = login(config, transport, session.email(), new_password).await?;
    expect_status(name, "login with the new password", &fresh, &[OK])?;
    ensure(name, fresh.field("token").and_then(Value::as_str).is_some_and(|token| !token.is_empty()), || {
        format!("login returned no token: {:?}", fresh.raw_body)
    })?;
    let stale = login(config, transport, session.email(), &session.credentials.password).await?;
    expect_status(name, "login with the old password", &stale, LOGIN_REFUSED)
}

/// The reset token comes back as the plain body, possibly JSON-quoted.
fn reset_token(outcome: &ResponseOutcome) -> Option<String> {
    let token = match &outcome.parsed_body {
        Some(Value::String(token)) => token.clone(),
        Some(body) => body.get("token")?.as_str()?.to_string(),
        None => outcome.raw_body.trim().to_string(),
    };
    (!token.is_empty()).then_some(token)
}

/// Forgot-password issues a token; resetting with it replaces the password.
pub async fn reset_flow<T: Transport>(config: &HarnessConfig, transport: &T) -> Result<(), HarnessError> {
    const NAME: &str = "password_reset";
    let session = establish_session_with(config, transport, Credentials::generate(config.run_label())).await?;
    let headers = public_headers();

    let forgot = transport
        .post(Some(json!({ "email": session.email() })), &config.url(Resource::ForgotPassword), &headers)
        .await?;
    expect_status(NAME, "forgot-password", &forgot, &[OK])?;
    let Some(token) = reset_token(&forgot) else {
        return Err(HarnessError::scenario(NAME, format!("forgot-password issued no token: {:?}", forgot.raw_body)));
    };

    let new_password = fake::password(12, true);
    let reset = transport
        .post(
            Some(json!({ "token": token, "newPassword": new_password, "timezone": SESSION_TIMEZONE })),
            &config.url(Resource::ResetPassword),
            &headers,
        )
        .await?;
    expect_status(NAME, "reset-password", &reset, &[OK, NO_CONTENT])?;
    only_new_password_works(NAME, config, transport, &session, &new_password).await
}

/// Changing the password as a logged-in user.
pub async fn change_flow<T: Transport>(config: &HarnessConfig, transport: &T) -> Result<(), HarnessError> {
    const NAME: &str = "password_change";
    let session = establish_session_with(config, transport, Credentials::generate(config.run_label())).await?;
    let mut client = ResourceClient::for_session(config, transport, Resource::ChangePassword, &session);

    let new_password = fake::password(12, true);
    let change = client
        .add(json!({
            "email": session.email(),
            "oldPassword": session.credentials.password,
            "newPassword": new_password,
        }))
        .await?;
    expect_status(NAME, "change-password", &change, &[OK, NO_CONTENT])?;
    only_new_password_works(NAME, config, transport, &session, &new_password).await
}
