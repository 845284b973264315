//! # Resource Client
//!
//! Thin CRUD adapter over one backend resource. Every call is tried against
//! the URL without and then with a trailing slash; the first answer that is
//! not 404/405 wins, otherwise the last answer is returned.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::auth::{AUTHORIZATION, Session};
use crate::environment::{HarnessConfig, Resource, url_variants};
use crate::error::HarnessError;
use crate::history::{History, HistoryEntry};
use crate::http::client::Transport;
use crate::http::method::HttpMethod;
use crate::http::negotiation::{AcceptMode, ContentTypeMode};
use crate::http::request::{Headers, RequestInput};
use crate::http::response::ResponseOutcome;
use crate::testing::case::TestCase;

/// Statuses that mean "try the other URL spelling".
const ROUTE_MISS: [u16; 2] = [404, 405];

#[derive(Debug)]
pub struct ResourceClient<'t, T: Transport> {
    url: String,
    headers: Headers,
    transport: &'t T,
    history: History,
    allow: BTreeMap<String, String>,
}

impl<'t, T: Transport> ResourceClient<'t, T> {
    pub fn new(transport: &'t T, url: impl Into<String>, headers: Headers) -> Self {
        Self {
            url: url.into(),
            headers,
            transport,
            history: History::new(),
            allow: BTreeMap::new(),
        }
    }

    /// Client whose headers follow the case's auth and negotiation modes.
    pub fn for_case(
        config: &HarnessConfig,
        transport: &'t T,
        resource: Resource,
        case: &TestCase,
        session: Option<&Session>,
    ) -> Result<Self, HarnessError> {
        let mut headers = Headers::new();
        case.auth_mode().apply(&mut headers, session.map(|session| &session.token))?;
        case.accept_mode().apply(&mut headers);
        case.content_type_mode().apply(&mut headers);
        Ok(Self::new(transport, config.url(resource), headers))
    }

    /// JSON in, JSON out, authenticated as the session's user.
    pub fn for_session(config: &HarnessConfig, transport: &'t T, resource: Resource, session: &Session) -> Self {
        let mut headers = Headers::new();
        headers.insert(AUTHORIZATION.to_string(), session.token.header_value());
        AcceptMode::Json.apply(&mut headers);
        ContentTypeMode::Json.apply(&mut headers);
        Self::new(transport, config.url(resource), headers)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// `Allow` header per URL asked; empty string when the header was missing.
    pub fn allowed_methods(&self) -> &BTreeMap<String, String> {
        &self.allow
    }

    pub async fn list(&mut self) -> Result<ResponseOutcome, HarnessError> {
        let url = self.url.clone();
        self.call(HttpMethod::Get, &url, None).await
    }

    pub async fn get(&mut self, id: &str) -> Result<ResponseOutcome, HarnessError> {
        let url = self.item_url(id);
        self.call(HttpMethod::Get, &url, None).await
    }

    pub async fn add(&mut self, payload: Value) -> Result<ResponseOutcome, HarnessError> {
        let url = self.url.clone();
        self.call(HttpMethod::Post, &url, Some(payload)).await
    }

    pub async fn update(&mut self, id: &str, payload: Value) -> Result<ResponseOutcome, HarnessError> {
        let url = self.item_url(id);
        self.call(HttpMethod::Put, &url, Some(payload)).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<ResponseOutcome, HarnessError> {
        let url = self.item_url(id);
        self.call(HttpMethod::Delete, &url, None).await
    }

    /// OPTIONS on every URL variant. Only records `Allow`; never fails a case
    /// on its own status.
    pub async fn check_options(&mut self) -> Result<(), HarnessError> {
        for url in url_variants(&self.url) {
            let request = RequestInput::new(HttpMethod::Options, url.as_str(), self.headers.clone(), None);
            let outcome = self.transport.send(request).await?;
            let allow = outcome.header("allow").unwrap_or_default().to_string();
            self.history
                .push(HistoryEntry::new(HttpMethod::Options, url.as_str(), outcome.status, &allow));
            self.allow.insert(url, allow);
        }
        Ok(())
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), id)
    }

    async fn call(&mut self, method: HttpMethod, url: &str, payload: Option<Value>) -> Result<ResponseOutcome, HarnessError> {
        let mut last = None;
        for variant in url_variants(url) {
            let request = RequestInput::new(method, variant.as_str(), self.headers.clone(), payload.clone());
            let outcome = self.transport.send(request).await?;
            self.history
                .push(HistoryEntry::new(method, variant.as_str(), outcome.status, &outcome.raw_body));
            if !ROUTE_MISS.contains(&outcome.status) {
                return Ok(outcome);
            }
            debug!(%method, url = %variant, status = outcome.status, "route miss, trying next variant");
            last = Some(outcome);
        }
        last.ok_or_else(|| HarnessError::Config(format!("cannot build a request URL from `{url}`")))
    }
}
