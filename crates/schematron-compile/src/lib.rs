//! Schematron-to-XSLT compilation.
//!
//! The canonical flow reads a ruleset such as `EPValidator.xml`, compiles
//! it, and writes `EPValidator.xslt` next to it. The generated stylesheet
//! emits SVRL and can be run by any XSLT 1.0 processor.

mod stylesheet;

use std::path::{Path, PathBuf};

use tracing::info;

use schematron_model::{Result, Schema};

pub use stylesheet::compile_with_phase;

/// Render `schema` into an XSLT 1.0 stylesheet with all patterns active per
/// the schema's own default phase.
pub fn compile(schema: &Schema) -> Result<String> {
    stylesheet::compile_with_phase(schema, None)
}

/// Compile the ruleset at `schema_path` and write the stylesheet to
/// `output_path`, defaulting to the input path with an `.xslt` extension.
/// Returns the path written.
pub fn compile_to_file(schema_path: &Path, output_path: Option<&Path>) -> Result<PathBuf> {
    compile_to_file_with_phase(schema_path, output_path, None)
}

/// Like [`compile_to_file`], restricted to the patterns of `phase`.
pub fn compile_to_file_with_phase(
    schema_path: &Path,
    output_path: Option<&Path>,
    phase: Option<&str>,
) -> Result<PathBuf> {
    let schema = Schema::parse_file(schema_path)?;
    let xslt = stylesheet::compile_with_phase(&schema, phase)?;
    let output_path = match output_path {
        Some(path) => path.to_path_buf(),
        None => schema_path.with_extension("xslt"),
    };
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, &xslt)?;
    info!(
        schema = %schema_path.display(),
        output = %output_path.display(),
        bytes = xslt.len(),
        "compiled schematron to xslt"
    );
    Ok(output_path)
}
