//! Native Schematron validation.
//!
//! A [`Validator`] holds a parsed ruleset and checks XML documents against
//! it, producing [`ValidationReport`]s and, on request, SVRL output.

mod engine;
mod report;
mod svrl;

pub use engine::Validator;
pub use report::{Finding, FindingKind, ValidationReport, write_report_json};
pub use svrl::{failed_assert_messages, to_svrl};
