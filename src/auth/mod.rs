//! # Authentication
//!
//! Resolves a case's auth mode into an `Authorization` header and bootstraps
//! a real bearer token through signup, set-password and login.

pub mod session;

use std::fmt::{self, Display};

use crate::error::HarnessError;
use crate::http::request::Headers;

pub use session::{Credentials, SESSION_TIMEZONE, Session, establish_session, establish_session_with};

pub const AUTHORIZATION: &str = "Authorization";

/// Token string the backend must reject.
pub const INVALID_TOKEN: &str = "invalid.token";

/// Which `Authorization` header a case sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Bearer token of a freshly established session.
    #[default]
    Valid,
    /// `Bearer invalid.token`.
    Invalid,
    /// No `Authorization` header.
    None,
}

impl AuthMode {
    /// Whether a case in this mode must be refused by a protected endpoint.
    pub fn is_unauthenticated(self) -> bool {
        !matches!(self, AuthMode::Valid)
    }

    pub fn apply(self, headers: &mut Headers, token: Option<&BearerToken>) -> Result<(), HarnessError> {
        match self {
            AuthMode::None => {
                headers.remove(AUTHORIZATION);
            }
            AuthMode::Invalid => {
                headers.insert(AUTHORIZATION.to_string(), format!("Bearer {INVALID_TOKEN}"));
            }
            AuthMode::Valid => {
                let token = token.ok_or_else(|| {
                    HarnessError::Config("case needs a valid bearer token but no session was established".into())
                })?;
                headers.insert(AUTHORIZATION.to_string(), token.header_value());
            }
        }
        Ok(())
    }
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthMode::Valid => "valid",
            AuthMode::Invalid => "invalid",
            AuthMode::None => "none",
        };
        write!(f, "{label}")
    }
}

/// A non-empty JWT issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Result<Self, HarnessError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(HarnessError::Config("Bearer token cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens end up in logs through Debug; keep only a prefix.
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "BearerToken({prefix}…)")
    }
}
