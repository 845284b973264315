//! Case-matrix contract tests for the FCLE backend API.
//!
//! Cases are plain data built per endpoint in [`suites`], sent through a
//! [`resource::ResourceClient`] over any [`http::client::Transport`], and
//! classified as PASS, FAIL or XFAIL by [`testing::classify`].

pub mod auth;
pub mod cli;
pub mod environment;
pub mod error;
pub mod fake;
pub mod history;
pub mod http;
pub mod resource;
pub mod scenarios;
pub mod suites;
pub mod testing;
