use serde_json::{Value, json};
use tracing::info;

use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::fake;
use crate::http::negotiation::{AcceptMode, ContentTypeMode};
use crate::http::request::Headers;
use crate::http::response::ResponseOutcome;
use crate::http::client::Transport;

use super::BearerToken;

/// Timezone sent on set-password and login.
pub const SESSION_TIMEZONE: &str = "UTC+4";

/// Minimum length of a login token that looks like a real JWT.
const MIN_LOGIN_TOKEN_LEN: usize = 11;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

impl Credentials {
    /// Fresh credentials, unique to this invocation.
    pub fn generate(run_label: &str) -> Self {
        Self {
            email: fake::email(run_label),
            password: fake::password(12, true),
            nickname: fake::nickname(8),
        }
    }
}

/// An authenticated user created for this run.
#[derive(Debug, Clone)]
pub struct Session {
    pub credentials: Credentials,
    pub token: BearerToken,
}

impl Session {
    pub fn email(&self) -> &str {
        &self.credentials.email
    }
}

/// Signup, set-password and login a brand new user.
pub async fn establish_session<T: Transport>(config: &HarnessConfig, transport: &T) -> Result<Session, HarnessError> {
    let credentials = Credentials::generate(config.run_label());
    establish_session_with(config, transport, credentials).await
}

pub async fn establish_session_with<T: Transport>(
    config: &HarnessConfig,
    transport: &T,
    credentials: Credentials,
) -> Result<Session, HarnessError> {
    let headers = public_headers();

    let signup = transport
        .post(
            Some(json!({ "email": credentials.email, "lang": "en" })),
            &config.url(Resource::Signup),
            &headers,
        )
        .await?;
    require_status("signup", &signup, &[200, 201])?;
    let signup_token = require_token("signup", &signup, 1)?;

    let set_password = transport
        .post(
            Some(json!({
                "token": signup_token,
                "newPassword": credentials.password,
                "nickname": credentials.nickname,
                "timezone": SESSION_TIMEZONE,
            })),
            &config.url(Resource::SetPassword),
            &headers,
        )
        .await?;
    require_status("set-password", &set_password, &[200, 204])?;

    let login = transport
        .post(
            Some(json!({
                "email": credentials.email,
                "password": credentials.password,
                "timezone": SESSION_TIMEZONE,
            })),
            &config.url(Resource::Login),
            &headers,
        )
        .await?;
    require_status("login", &login, &[200])?;
    let token = BearerToken::new(require_token("login", &login, MIN_LOGIN_TOKEN_LEN)?)?;

    info!(email = %credentials.email, "session established");
    Ok(Session { credentials, token })
}

/// JSON in and out, no token.
pub(crate) fn public_headers() -> Headers {
    let mut headers = Headers::new();
    AcceptMode::Json.apply(&mut headers);
    ContentTypeMode::Json.apply(&mut headers);
    headers
}

fn require_status(step: &'static str, outcome: &ResponseOutcome, allowed: &[u16]) -> Result<(), HarnessError> {
    if allowed.contains(&outcome.status) {
        return Ok(());
    }
    Err(HarnessError::Session {
        step,
        status: outcome.status,
        body: outcome.raw_body.clone(),
    })
}

fn require_token(step: &'static str, outcome: &ResponseOutcome, min_len: usize) -> Result<String, HarnessError> {
    match outcome.field("token").and_then(Value::as_str) {
        Some(token) if token.len() >= min_len => Ok(token.to_string()),
        _ => Err(HarnessError::Session {
            step,
            status: outcome.status,
            body: outcome.raw_body.clone(),
        }),
    }
}
