//! Validation findings and reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use schematron_model::Severity;

/// How a finding was produced: an assert whose test was false, or a report
/// whose test was true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    FailedAssert,
    SuccessfulReport,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    /// Whitespace-normalized assertion message.
    pub message: String,
    /// Location of the matched node, `/root[1]/child[2]` style.
    pub location: String,
    /// The XPath test that produced the finding.
    pub test: String,
    /// Context expression of the rule that matched.
    pub rule_context: String,
    /// Label of the pattern the rule belongs to.
    pub pattern: Option<String>,
    pub check_id: Option<String>,
}

/// Validation report for one document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub document: String,
    pub phase: Option<String>,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new(document: impl Into<String>, phase: Option<String>) -> Self {
        Self {
            document: document.into(),
            phase,
            findings: Vec::new(),
        }
    }

    /// Messages of all error-severity findings, in document order.
    pub fn errors(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .map(|f| f.message.as_str())
            .collect()
    }

    /// Messages of all warning-severity findings, in document order.
    pub fn warnings(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .map(|f| f.message.as_str())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    /// A document is valid when no error-severity finding was recorded.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Render the full report as human-readable text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let verdict = if self.is_valid() { "valid" } else { "invalid" };
        let _ = writeln!(
            out,
            "{}: {} ({} error(s), {} warning(s))",
            self.document,
            verdict,
            self.error_count(),
            self.warning_count()
        );
        for finding in &self.findings {
            let label = match finding.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARN",
                Severity::Info => "INFO",
            };
            let _ = writeln!(
                out,
                "  {} [{}] {}",
                label, finding.location, finding.message
            );
        }
        out
    }
}

#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    reports: Vec<ReportSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct ReportSummary<'a> {
    document: &'a str,
    phase: Option<&'a str>,
    valid: bool,
    error_count: usize,
    warning_count: usize,
    findings: &'a [Finding],
}

const REPORT_SCHEMA: &str = "schematron.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Write a versioned JSON payload for `reports` to `output_path`.
pub fn write_report_json(output_path: &Path, reports: &[ValidationReport]) -> Result<PathBuf> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        reports: reports
            .iter()
            .map(|report| ReportSummary {
                document: &report.document,
                phase: report.phase.as_deref(),
                valid: report.is_valid(),
                error_count: report.error_count(),
                warning_count: report.warning_count(),
                findings: &report.findings,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(output_path, format!("{json}\n"))
        .with_context(|| format!("write {}", output_path.display()))?;
    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{Finding, FindingKind, ValidationReport};
    use schematron_model::Severity;

    fn finding(severity: Severity, message: &str) -> Finding {
        Finding {
            kind: FindingKind::FailedAssert,
            severity,
            message: message.to_string(),
            location: "/library[1]/book[2]".to_string(),
            test: "@isbn".to_string(),
            rule_context: "book".to_string(),
            pattern: Some("shelf".to_string()),
            check_id: None,
        }
    }

    #[test]
    fn counts_and_validity() {
        let mut report = ValidationReport::new("books.xml", None);
        assert!(report.is_valid());
        report.findings.push(finding(Severity::Error, "no isbn"));
        report.findings.push(finding(Severity::Warning, "no title"));
        report.findings.push(finding(Severity::Info, "withdrawn"));
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.errors(), vec!["no isbn"]);
        assert_eq!(report.warnings(), vec!["no title"]);
    }

    #[test]
    fn renders_text_report() {
        let mut report = ValidationReport::new("books.xml", None);
        report.findings.push(finding(Severity::Error, "no isbn"));
        report.findings.push(finding(Severity::Warning, "no title"));
        insta::assert_snapshot!(report.render_text(), @r"
        books.xml: invalid (1 error(s), 1 warning(s))
          ERROR [/library[1]/book[2]] no isbn
          WARN [/library[1]/book[2]] no title
        ");
    }
}
