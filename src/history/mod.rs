//! # Exchange History
//!
//! Every request a client issues is recorded here so that a failing case can
//! print what was actually sent and received.

use std::collections::VecDeque;
use std::fmt::{self, Display};

use crate::http::method::HttpMethod;

/// Maximum number of exchanges retained per client.
const MAX_HISTORY_ENTRIES: usize = 50;

/// Longest body excerpt kept per entry.
const MAX_DETAIL_CHARS: usize = 500;

/// A single exchange: what was called and what came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    /// Response body excerpt, or the `Allow` header for OPTIONS requests.
    pub detail: String,
}

impl HistoryEntry {
    pub fn new(method: HttpMethod, url: impl Into<String>, status: u16, detail: &str) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            detail: excerpt(detail),
        }
    }
}

impl Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {} {:?}", self.method, self.url, self.status, self.detail)
    }
}

/// Chronological exchange log, oldest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry, evicting the oldest one when the log is full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// One line per exchange, for failure messages.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "<no requests recorded>".to_string();
        }
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn excerpt(detail: &str) -> String {
    if detail.chars().count() <= MAX_DETAIL_CHARS {
        return detail.to_string();
    }
    let mut cut: String = detail.chars().take(MAX_DETAIL_CHARS).collect();
    cut.push('…');
    cut
}
