//! Integration tests driving the `schematron` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

use libxml::parser::Parser;

fn cli_exe() -> &'static str {
    env!("CARGO_BIN_EXE_schematron")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(cli_exe())
        .args(args)
        .output()
        .expect("run schematron binary")
}

#[test]
fn compile_writes_stylesheet_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = dir.path().join("EPValidator.xml");
    std::fs::copy(fixture("library.sch"), &schema).expect("copy fixture");

    let output = run(&["compile", schema.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stylesheet = dir.path().join("EPValidator.xslt");
    assert!(stylesheet.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EPValidator.xslt"));

    let contents = std::fs::read_to_string(&stylesheet).expect("read stylesheet");
    assert!(!contents.is_empty());
    let doc = Parser::default()
        .parse_string(&contents)
        .expect("stylesheet is well-formed xml");
    assert_eq!(
        doc.get_root_element().expect("root").get_name(),
        "stylesheet"
    );
}

#[test]
fn compile_honors_explicit_output_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("compiled").join("rules.xslt");

    let output = run(&[
        "compile",
        fixture("library.sch").to_str().expect("utf-8 path"),
        "-o",
        out.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());
    assert!(out.exists());
}

#[test]
fn compile_fails_for_missing_schema() {
    let output = run(&["compile", "/no/such/ruleset.sch"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn validate_passes_for_conforming_document() {
    let output = run(&[
        "validate",
        fixture("library.sch").to_str().expect("utf-8 path"),
        fixture("library.xml").to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VALID"), "stdout: {stdout}");
}

#[test]
fn validate_fails_for_nonconforming_document() {
    let output = run(&[
        "validate",
        fixture("library.sch").to_str().expect("utf-8 path"),
        fixture("library-invalid.xml").to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INVALID"), "stdout: {stdout}");
    assert!(
        stdout.contains("A book must carry an ISBN."),
        "stdout: {stdout}"
    );
}

#[test]
fn validate_emits_json_reports() {
    let output = run(&[
        "validate",
        fixture("library.sch").to_str().expect("utf-8 path"),
        fixture("library-invalid.xml").to_str().expect("utf-8 path"),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reports: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is json");
    assert_eq!(reports[0]["findings"][0]["severity"], "error");
}

#[test]
fn validate_emits_svrl() {
    let output = run(&[
        "validate",
        fixture("library.sch").to_str().expect("utf-8 path"),
        fixture("library-invalid.xml").to_str().expect("utf-8 path"),
        "--format",
        "svrl",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("svrl:failed-assert"), "stdout: {stdout}");
}

#[test]
fn validate_writes_report_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report_path = dir.path().join("validation.json");

    let output = run(&[
        "validate",
        fixture("library.sch").to_str().expect("utf-8 path"),
        fixture("library.xml").to_str().expect("utf-8 path"),
        "--report-file",
        report_path.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
            .expect("report is json");
    assert_eq!(payload["schema"], "schematron.validation-report");
    assert_eq!(payload["reports"][0]["valid"], true);
}
