pub mod error;
pub mod parse;
pub mod schema;

pub use error::{Result, SchematronError};
pub use parse::collapse_whitespace;
pub use schema::{
    Check, CheckKind, ISO_SCHEMATRON_NS, LEGACY_SCHEMATRON_NS, NsDecl, Pattern, Phase, Rule,
    SVRL_NS, Schema, Severity,
};
