//! `GET Accounting/user-account-transactions`.

use std::collections::HashSet;

use serde_json::Value;

use crate::environment::{HarnessConfig, Resource};
use crate::http::response::ResponseOutcome;
use crate::testing::case::TestCase;
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::account_balance::negotiation_cases;
use super::{is_currency_code, is_iso_timestamp, numeric};

/// Only the head of a long history is inspected.
const INSPECTED_ITEMS: usize = 50;
const AMOUNT_TOLERANCE: f64 = 0.01;

pub fn suite() -> Suite {
    Suite {
        name: "account_transactions",
        resource: Resource::AccountTransactions,
        operation: Operation::List,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(ledger_rules),
        seed: None,
    }
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    negotiation_cases()
}

pub fn shape() -> Shape {
    let id = || vec![FieldType::Integer, FieldType::Text];
    let account = Schema::new([
        FieldRule::optional("id", id()),
        FieldRule::optional("currencyCode", [FieldType::Text]),
    ]);
    let transaction = Schema::new([
        FieldRule::optional("id", id()),
        FieldRule::optional("amount", [FieldType::Number]),
        FieldRule::optional("feeAmount", [FieldType::Number]),
        FieldRule::optional("totalAmount", [FieldType::Number]),
        FieldRule::optional("currency", [FieldType::Text]),
        FieldRule::optional("status", [FieldType::Text]),
        FieldRule::optional("transactionDate", [FieldType::Text]),
        FieldRule::optional("description", [FieldType::Text]),
    ]);
    Shape::List(Schema::new([
        FieldRule::optional("transactionId", id()),
        FieldRule::optional("accountId", id()),
        FieldRule::optional("debit", [FieldType::Number]),
        FieldRule::optional("credit", [FieldType::Number]),
        FieldRule::optional("createdAt", [FieldType::Text]),
        FieldRule::optional("currencyCode", [FieldType::Text]),
        FieldRule::optional("account", [FieldType::Object(account)]),
        FieldRule::optional("transaction", [FieldType::Object(transaction)]),
    ]))
}

/// Per entry: ISO timestamps, upper-case currencies, non-negative debit and
/// credit that are never both positive, transaction amount matching the
/// non-zero side, and no repeated `transactionId`.
pub fn ledger_rules(_case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    let Some(items) = outcome.parsed_body.as_ref().and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    let mut seen_ids = HashSet::new();
    for (idx, item) in items.iter().take(INSPECTED_ITEMS).enumerate() {
        let transaction = item.get("transaction");
        let mut check_timestamp = |name: &str, value: Option<&Value>| {
            if let Some(text) = value.and_then(Value::as_str) {
                if !is_iso_timestamp(text) {
                    violations.push(format!("[{idx}] `{name}` is not ISO-8601: {text:?}"));
                }
            }
        };
        check_timestamp("createdAt", item.get("createdAt"));
        check_timestamp("transaction.transactionDate", transaction.and_then(|trx| trx.get("transactionDate")));

        for (name, value) in [
            ("currencyCode", item.get("currencyCode")),
            ("transaction.currency", transaction.and_then(|trx| trx.get("currency"))),
        ] {
            if let Some(code) = value.and_then(Value::as_str) {
                if !is_currency_code(code) {
                    violations.push(format!("[{idx}] `{name}` must be three upper-case letters: {code:?}"));
                }
            }
        }

        let debit = item.get("debit").and_then(numeric);
        let credit = item.get("credit").and_then(numeric);
        if debit.is_some_and(|debit| debit < 0.0) {
            violations.push(format!("[{idx}] debit is negative"));
        }
        if credit.is_some_and(|credit| credit < 0.0) {
            violations.push(format!("[{idx}] credit is negative"));
        }
        if let (Some(debit), Some(credit)) = (debit, credit) {
            if debit > 0.0 && credit > 0.0 {
                violations.push(format!("[{idx}] both debit ({debit}) and credit ({credit}) are positive"));
            }
        }

        if let Some(amount) = transaction.and_then(|trx| trx.get("amount")).and_then(numeric) {
            let side = match (debit, credit) {
                (Some(debit), _) if debit > 0.0 => Some(("debit", debit)),
                (_, Some(credit)) if credit > 0.0 => Some(("credit", credit)),
                _ => None,
            };
            if let Some((name, side)) = side {
                if (amount - side).abs() > AMOUNT_TOLERANCE {
                    violations.push(format!("[{idx}] transaction.amount {amount} != {name} {side}"));
                }
            }
        }

        if let Some(id) = item.get("transactionId").filter(|id| !id.is_null()) {
            let key = match id {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            if !seen_ids.insert(key) {
                violations.push(format!("[{idx}] duplicate transactionId {id}"));
            }
        }
    }
    violations
}
