use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use schematron_validate::{ValidationReport, Validator, to_svrl, write_report_json};

use crate::cli::{CompileArgs, ResultFormatArg, ValidateArgs};

/// Result of a `validate` run.
pub struct ValidateOutcome {
    pub reports: Vec<ValidationReport>,
    /// Rendered SVRL documents, one per input, when SVRL output was asked for.
    pub svrl: Vec<String>,
    pub report_file: Option<PathBuf>,
}

impl ValidateOutcome {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|report| !report.is_valid())
    }
}

pub fn run_compile(args: &CompileArgs) -> Result<PathBuf> {
    let span = info_span!("compile", schema = %args.schema.display());
    let _guard = span.enter();
    schematron_compile::compile_to_file_with_phase(
        &args.schema,
        args.output.as_deref(),
        args.phase.as_deref(),
    )
    .with_context(|| format!("compile {}", args.schema.display()))
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateOutcome> {
    let span = info_span!("validate", schema = %args.schema.display());
    let _guard = span.enter();

    let mut validator = Validator::from_file(&args.schema)
        .with_context(|| format!("load ruleset {}", args.schema.display()))?;
    if let Some(phase) = &args.phase {
        validator = validator.with_phase(phase.clone());
    }
    debug!(
        patterns = validator.schema().patterns.len(),
        rules = validator.schema().rule_count(),
        "loaded ruleset"
    );

    let mut reports = Vec::new();
    let mut svrl = Vec::new();
    for document in &args.documents {
        let report = validator
            .validate_file(document)
            .with_context(|| format!("validate {}", document.display()))?;
        if matches!(args.format, ResultFormatArg::Svrl) {
            svrl.push(
                to_svrl(&report, validator.schema())
                    .with_context(|| format!("render svrl for {}", document.display()))?,
            );
        }
        reports.push(report);
    }

    let report_file = match &args.report_file {
        Some(path) => Some(
            write_report_json(path, &reports)
                .with_context(|| format!("write report {}", path.display()))?,
        ),
        None => None,
    };

    Ok(ValidateOutcome {
        reports,
        svrl,
        report_file,
    })
}
