use thiserror::Error;

use crate::http::method::HttpMethod;
use crate::testing::classify::Failure;

/// Everything that can stop a case, a scenario or the runner itself.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// No response arrived: connect error, timeout, unreadable body.
    #[error("{method} {url} failed before a response arrived: {message}")]
    Transport {
        method: HttpMethod,
        url: String,
        message: String,
    },

    #[error("invalid header `{name}`: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// A step of the signup / set-password / login bootstrap did not answer as required.
    #[error("session setup failed at {step}: status {status}, body {body:?}")]
    Session {
        step: &'static str,
        status: u16,
        body: String,
    },

    /// The record a case addresses could not be created beforehand.
    #[error("could not create the record for suite `{suite}`: status {status}, body {body:?}")]
    Seed {
        suite: &'static str,
        status: u16,
        body: String,
    },

    /// Expectation mismatch or schema violation for one case.
    #[error("{0}")]
    Contract(Box<Failure>),

    #[error("scenario `{scenario}` failed: {message}")]
    Scenario {
        scenario: &'static str,
        message: String,
    },

    #[error("duplicate case label `{0}`")]
    DuplicateLabel(String),

    #[error("unknown suite `{0}`")]
    UnknownSuite(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn scenario(scenario: &'static str, message: impl Into<String>) -> Self {
        HarnessError::Scenario {
            scenario,
            message: message.into(),
        }
    }
}
