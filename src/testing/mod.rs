//! # Contract Testing
//!
//! Case matrices, soft schema validation, outcome classification and the
//! runner that ties them to a `ResourceClient`.

pub mod case;
pub mod classify;
pub mod report;
pub mod runner;
pub mod schema;

pub use case::{KnownDefect, StatusSet, TestCase, ensure_unique_labels};
pub use classify::{Disposition, Failure, FailureKind, classify};
pub use report::{CaseResult, RunReport, Verdict};
pub use runner::{CaseRun, Operation, Suite, execute_case, run_suites};
pub use schema::{FieldRule, FieldType, Schema, Shape};
