use std::collections::BTreeMap;

use serde_json::Value;

/// One HTTP answer, consumed right away by assertions.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: BTreeMap<String, String>,
    pub raw_body: String,
    /// `None` when the body is empty or is not JSON.
    pub parsed_body: Option<Value>,
}

impl ResponseOutcome {
    pub fn new(status: u16, headers: BTreeMap<String, String>, raw_body: String) -> Self {
        let headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        let content_type = headers.get("content-type").map(String::as_str).unwrap_or("");
        let parsed_body = if looks_like_json(&raw_body, content_type) {
            serde_json::from_str(raw_body.trim()).ok()
        } else {
            None
        };

        Self {
            status,
            headers,
            raw_body,
            parsed_body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type().to_ascii_lowercase().contains("json") || self.parsed_body.is_some()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.parsed_body.as_ref().and_then(|body| body.get(key))
    }

    /// Backend error code, found either under `error.code` or at top-level `code`.
    pub fn error_code(&self) -> Option<&str> {
        let body = self.parsed_body.as_ref()?;
        body.get("error")
            .and_then(|error| error.get("code"))
            .and_then(Value::as_str)
            .or_else(|| body.get("code").and_then(Value::as_str))
    }
}

fn looks_like_json(raw: &str, content_type: &str) -> bool {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.starts_with('{') || trimmed.starts_with('[') || content_type.to_ascii_lowercase().contains("json")
}
