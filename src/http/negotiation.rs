//! Accept / Content-Type variants a case can exercise.

use std::fmt::{self, Display};

use super::request::Headers;

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptMode {
    #[default]
    Json,
    Text,
    Xml,
    Any,
    /// No Accept header at all.
    Absent,
    TextCharset,
    JsonCharset,
}

impl AcceptMode {
    pub const ALL: [AcceptMode; 7] = [
        AcceptMode::Json,
        AcceptMode::Text,
        AcceptMode::Xml,
        AcceptMode::Any,
        AcceptMode::Absent,
        AcceptMode::TextCharset,
        AcceptMode::JsonCharset,
    ];

    pub fn header_value(self) -> Option<&'static str> {
        match self {
            AcceptMode::Json => Some("application/json"),
            AcceptMode::Text => Some("text/plain"),
            AcceptMode::Xml => Some("application/xml"),
            AcceptMode::Any => Some("*/*"),
            AcceptMode::Absent => None,
            AcceptMode::TextCharset => Some("text/plain; charset=utf-8"),
            AcceptMode::JsonCharset => Some("application/json; charset=utf-8"),
        }
    }

    pub fn apply(self, headers: &mut Headers) {
        match self.header_value() {
            Some(value) => {
                headers.insert(ACCEPT.to_string(), value.to_string());
            }
            None => {
                headers.remove(ACCEPT);
            }
        }
    }
}

impl Display for AcceptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header_value().unwrap_or("<absent>"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypeMode {
    #[default]
    Json,
    /// Deliberately wrong type; the body is still JSON.
    TextPlain,
    Absent,
}

impl ContentTypeMode {
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            ContentTypeMode::Json => Some("application/json"),
            ContentTypeMode::TextPlain => Some("text/plain"),
            ContentTypeMode::Absent => None,
        }
    }

    pub fn apply(self, headers: &mut Headers) {
        match self.header_value() {
            Some(value) => {
                headers.insert(CONTENT_TYPE.to_string(), value.to_string());
            }
            None => {
                headers.remove(CONTENT_TYPE);
            }
        }
    }
}
