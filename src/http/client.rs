use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, redirect};
use serde_json::Value;
use tracing::debug;

use crate::error::HarnessError;

use super::method::HttpMethod;
use super::request::{Headers, RequestInput};
use super::response::ResponseOutcome;

/// The only way the harness reaches the backend.
///
/// Implementations issue exactly one request per call. A missing response
/// (connect error, timeout) is an `Err`; every HTTP status is an `Ok`.
pub trait Transport {
    fn send(&self, request: RequestInput) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send;

    fn get(&self, url: &str, headers: &Headers) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        self.send(RequestInput::new(HttpMethod::Get, url, headers.clone(), None))
    }

    fn post(
        &self,
        payload: Option<Value>,
        url: &str,
        headers: &Headers,
    ) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        self.send(RequestInput::new(HttpMethod::Post, url, headers.clone(), payload))
    }

    fn put(
        &self,
        payload: Option<Value>,
        url: &str,
        headers: &Headers,
    ) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        self.send(RequestInput::new(HttpMethod::Put, url, headers.clone(), payload))
    }

    fn delete(
        &self,
        payload: Option<Value>,
        url: &str,
        headers: &Headers,
    ) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        self.send(RequestInput::new(HttpMethod::Delete, url, headers.clone(), payload))
    }

    fn options(&self, url: &str, headers: &Headers) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        self.send(RequestInput::new(HttpMethod::Options, url, headers.clone(), None))
    }
}

/// `Transport` over a shared reqwest client with a fixed per-call timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HarnessError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(|err| HarnessError::Config(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: RequestInput) -> impl Future<Output = Result<ResponseOutcome, HarnessError>> + Send {
        let client = self.client.clone();
        async move { execute(&client, request).await }
    }
}

async fn execute(client: &Client, request: RequestInput) -> Result<ResponseOutcome, HarnessError> {
    let method = request.method;
    let url = request.url.clone();
    let transport_error = |message: String| HarnessError::Transport {
        method,
        url: url.clone(),
        message,
    };

    // Content-Type is whatever the caller put in the headers, including none.
    let headers = build_headers(&request.headers)?;
    let body = request.wire_body();

    let mut builder = client.request(method.into(), &request.url).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let started = Instant::now();
    let response = builder
        .send()
        .await
        .map_err(|err| transport_error(format!("Request failed: {err}")))?;
    let elapsed = started.elapsed().as_millis();

    let status = response.status().as_u16();
    let response_headers = collect_headers(response.headers());
    let bytes = response
        .bytes()
        .await
        .map_err(|err| transport_error(format!("Failed to read response: {err}")))?;
    let raw_body = String::from_utf8_lossy(&bytes).into_owned();

    debug!(%method, url = %request.url, status, elapsed_ms = elapsed, size = bytes.len(), "exchange");

    Ok(ResponseOutcome::new(status, response_headers, raw_body))
}

pub fn build_headers(input: &Headers) -> Result<HeaderMap, HarnessError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| HarnessError::InvalidHeader {
            name: key.clone(),
            message: err.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| HarnessError::InvalidHeader {
            name: key.clone(),
            message: err.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        collected
            .entry(name.to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
