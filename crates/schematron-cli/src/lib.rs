//! Library surface of the `schematron` CLI: logging setup shared with tests.

pub mod logging;
