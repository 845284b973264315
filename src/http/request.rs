use std::collections::BTreeMap;

use serde_json::Value;

use super::method::HttpMethod;

/// Request headers by canonical name (`Authorization`, `Accept`, `Content-Type`).
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl RequestInput {
    pub fn new(method: HttpMethod, url: impl Into<String>, headers: Headers, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// The body as it goes on the wire; dropped for verbs that never carry one.
    pub fn wire_body(&self) -> Option<String> {
        if !self.method.carries_body() {
            return None;
        }
        self.body.as_ref().map(Value::to_string)
    }
}
