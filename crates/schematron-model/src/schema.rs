//! Typed model for a parsed Schematron ruleset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchematronError};

/// ISO Schematron namespace.
pub const ISO_SCHEMATRON_NS: &str = "http://purl.oclc.org/dsdl/schematron";

/// Legacy Schematron 1.5 namespace, still common in older rulesets.
pub const LEGACY_SCHEMATRON_NS: &str = "http://www.ascc.net/xml/schematron";

/// SVRL (Schematron Validation Report Language) namespace.
pub const SVRL_NS: &str = "http://purl.oclc.org/dsdl/svrl";

/// Severity of a finding, derived from the assertion's `role`/`flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map a `role` (or `flag`, when no role is given) to a severity.
    ///
    /// Unknown and absent roles are treated as errors: a bare `<assert>` in
    /// every ruleset we have seen is meant to fail validation.
    pub fn from_role(role: Option<&str>, flag: Option<&str>) -> Self {
        let label = role.or(flag).unwrap_or("");
        match label.to_ascii_lowercase().as_str() {
            "warning" | "warn" | "caution" => Severity::Warning,
            "info" | "information" | "hint" => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// A namespace declaration (`<ns prefix="..." uri="..."/>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsDecl {
    pub prefix: String,
    pub uri: String,
}

/// A validation phase: a named subset of active patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    /// Pattern ids listed in `<active pattern="..."/>` children.
    pub active: Vec<String>,
}

/// Whether a check fires on a false test (`assert`) or a true one (`report`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    Assert,
    Report,
}

/// An `<assert>` or `<report>` inside a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub kind: CheckKind,
    /// XPath 1.0 test expression.
    pub test: String,
    pub id: Option<String>,
    pub role: Option<String>,
    pub flag: Option<String>,
    /// Human-readable message, whitespace-normalized.
    pub message: String,
}

impl Check {
    pub fn severity(&self) -> Severity {
        Severity::from_role(self.role.as_deref(), self.flag.as_deref())
    }
}

/// A `<rule context="...">` with its checks in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Option<String>,
    /// XPath context expression selecting the nodes this rule applies to.
    pub context: String,
    pub checks: Vec<Check>,
}

/// A `<pattern>` grouping rules. Within one pattern a node is matched by at
/// most one rule (lexically first wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: Option<String>,
    pub title: Option<String>,
    pub rules: Vec<Rule>,
}

impl Pattern {
    /// Label used in reports and SVRL output: id, then title, then a blank.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }
}

/// A parsed Schematron schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub title: Option<String>,
    pub default_phase: Option<String>,
    pub namespaces: Vec<NsDecl>,
    pub phases: Vec<Phase>,
    pub patterns: Vec<Pattern>,
}

impl Schema {
    /// Resolve the patterns active for `phase`.
    ///
    /// `None` falls back to the schema's `defaultPhase` when one is declared,
    /// otherwise every pattern is active. The pseudo-phase `#ALL` always
    /// selects every pattern.
    pub fn active_patterns(&self, phase: Option<&str>) -> Result<Vec<&Pattern>> {
        let requested = phase.or(self.default_phase.as_deref());
        let Some(name) = requested else {
            return Ok(self.patterns.iter().collect());
        };
        if name == "#ALL" {
            return Ok(self.patterns.iter().collect());
        }
        let phase = self
            .phases
            .iter()
            .find(|p| p.id == name)
            .ok_or_else(|| SchematronError::UnknownPhase(name.to_string()))?;
        Ok(self
            .patterns
            .iter()
            .filter(|pattern| {
                pattern
                    .id
                    .as_deref()
                    .is_some_and(|id| phase.active.iter().any(|a| a == id))
            })
            .collect())
    }

    /// Total number of rules across all patterns.
    pub fn rule_count(&self) -> usize {
        self.patterns.iter().map(|p| p.rules.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_role() {
        assert_eq!(Severity::from_role(None, None), Severity::Error);
        assert_eq!(Severity::from_role(Some("ERROR"), None), Severity::Error);
        assert_eq!(
            Severity::from_role(Some("warning"), None),
            Severity::Warning
        );
        assert_eq!(Severity::from_role(Some("info"), None), Severity::Info);
        // flag is only consulted when role is absent
        assert_eq!(
            Severity::from_role(Some("fatal"), Some("warning")),
            Severity::Error
        );
        assert_eq!(
            Severity::from_role(None, Some("warn")),
            Severity::Warning
        );
    }

    fn pattern(id: &str) -> Pattern {
        Pattern {
            id: Some(id.to_string()),
            title: None,
            rules: Vec::new(),
        }
    }

    #[test]
    fn phase_selection() {
        let schema = Schema {
            title: None,
            default_phase: None,
            namespaces: Vec::new(),
            phases: vec![Phase {
                id: "basic".to_string(),
                active: vec!["p1".to_string()],
            }],
            patterns: vec![pattern("p1"), pattern("p2")],
        };
        assert_eq!(schema.active_patterns(None).unwrap().len(), 2);
        assert_eq!(schema.active_patterns(Some("#ALL")).unwrap().len(), 2);
        let active = schema.active_patterns(Some("basic")).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_deref(), Some("p1"));
        assert!(matches!(
            schema.active_patterns(Some("nope")),
            Err(SchematronError::UnknownPhase(_))
        ));
    }

    #[test]
    fn default_phase_applies_when_no_phase_requested() {
        let schema = Schema {
            title: None,
            default_phase: Some("basic".to_string()),
            namespaces: Vec::new(),
            phases: vec![Phase {
                id: "basic".to_string(),
                active: vec!["p2".to_string()],
            }],
            patterns: vec![pattern("p1"), pattern("p2")],
        };
        let active = schema.active_patterns(None).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_deref(), Some("p2"));
    }
}
