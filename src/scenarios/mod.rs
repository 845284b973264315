//! # Scenarios
//!
//! Multi-step business flows. Each step must succeed before the next one
//! runs; the first broken expectation ends the flow with
//! `HarnessError::Scenario`.

pub mod accounting;
pub mod favorites;
pub mod languages;
pub mod materials;
pub mod onboarding;
pub mod passwords;

use crate::error::HarnessError;
use crate::http::response::ResponseOutcome;

pub use favorites::FavoritesApi;

pub(crate) fn expect_status(
    scenario: &'static str,
    step: &str,
    outcome: &ResponseOutcome,
    allowed: &[u16],
) -> Result<(), HarnessError> {
    if allowed.contains(&outcome.status) {
        return Ok(());
    }
    Err(HarnessError::scenario(
        scenario,
        format!(
            "{step}: expected one of {allowed:?}, got {} with body {:?}",
            outcome.status, outcome.raw_body
        ),
    ))
}

pub(crate) fn ensure(scenario: &'static str, holds: bool, message: impl FnOnce() -> String) -> Result<(), HarnessError> {
    if holds {
        Ok(())
    } else {
        Err(HarnessError::scenario(scenario, message()))
    }
}
