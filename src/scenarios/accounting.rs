use serde_json::json;

use crate::auth::Session;
use crate::environment::{HarnessConfig, Resource};
use crate::error::HarnessError;
use crate::http::client::Transport;
use crate::resource::ResourceClient;
use crate::suites::{VALIDATION, numeric};
use crate::testing::case::{CREATED, OK};

use super::{ensure, expect_status};

/// A deposit of 100 comes back with the same amount.
pub async fn deposit_echo<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "deposit_echo";
    let mut client = ResourceClient::for_session(config, transport, Resource::Deposit, session);
    let outcome = client.add(json!({ "amount": 100, "description": "scenario" })).await?;
    expect_status(NAME, "deposit", &outcome, &[OK, CREATED])?;
    let echoed = outcome.field("amount").and_then(numeric);
    ensure(NAME, echoed.is_some_and(|amount| (amount - 100.0).abs() < 0.01), || {
        format!("amount echoed as {echoed:?}: {:?}", outcome.raw_body)
    })
}

/// A negative deposit is a validation error about the amount.
pub async fn deposit_negative<T: Transport>(config: &HarnessConfig, transport: &T, session: &Session) -> Result<(), HarnessError> {
    const NAME: &str = "deposit_negative";
    let mut client = ResourceClient::for_session(config, transport, Resource::Deposit, session);
    let outcome = client.add(json!({ "amount": -50 })).await?;
    expect_status(NAME, "deposit", &outcome, VALIDATION)?;
    ensure(NAME, outcome.raw_body.to_lowercase().contains("amount"), || {
        format!("error does not mention amount: {:?}", outcome.raw_body)
    })
}
