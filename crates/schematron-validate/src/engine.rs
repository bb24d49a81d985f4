//! XPath-driven validation engine.
//!
//! Rules are evaluated natively against the instance document instead of
//! routing through the compiled stylesheet: each rule context selects its
//! nodes, and every check's test expression is evaluated with the matched
//! node as XPath context.

use std::path::Path;

use libxml::parser::Parser;
use libxml::tree::{Document, Node, NodeType};
use libxml::xpath::Context;
use tracing::{debug, info};

use schematron_model::{CheckKind, Result, Schema, SchematronError};

use crate::report::{Finding, FindingKind, ValidationReport};

/// Validates XML documents against one parsed Schematron schema.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    phase: Option<String>,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            phase: None,
        }
    }

    /// Load the ruleset from disk. The path must name an existing regular
    /// file; the distinct failure modes mirror what callers report to users.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(Schema::parse_file(path)?))
    }

    /// Restrict validation to the given phase.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport> {
        if !path.exists() {
            return Err(SchematronError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(SchematronError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| SchematronError::Parse(format!("not valid utf-8: {e}")))?;
        self.validate_str(&xml, &path.display().to_string())
    }

    /// Validate an in-memory document. `document` is the label used in the
    /// report.
    pub fn validate_str(&self, xml: &str, document: &str) -> Result<ValidationReport> {
        let doc = Parser::default()
            .parse_string(xml)
            .map_err(|e| SchematronError::Parse(format!("{e:?}")))?;
        self.validate_doc(&doc, document)
    }

    fn validate_doc(&self, doc: &Document, document: &str) -> Result<ValidationReport> {
        let mut ctx = xpath_context(doc, &self.schema)?;
        let mut report = ValidationReport::new(document, self.phase.clone());

        for pattern in self.schema.active_patterns(self.phase.as_deref())? {
            // Within a pattern the lexically first matching rule claims a
            // node; later rules skip it.
            let mut claimed: Vec<Node> = Vec::new();
            for rule in &pattern.rules {
                let selector = absolute_context(&rule.context);
                let nodes = ctx
                    .findnodes(&selector, Some(&doc.as_node()))
                    .map_err(|_| SchematronError::Xpath {
                        expression: selector.clone(),
                    })?;
                debug!(
                    context = rule.context.as_str(),
                    matched = nodes.len(),
                    "evaluated rule context"
                );
                for node in nodes {
                    if claimed.contains(&node) {
                        continue;
                    }
                    claimed.push(node.clone());
                    for check in &rule.checks {
                        let holds = eval_test(&mut ctx, &node, &check.test)?;
                        let fired = match check.kind {
                            CheckKind::Assert => !holds,
                            CheckKind::Report => holds,
                        };
                        if !fired {
                            continue;
                        }
                        report.findings.push(Finding {
                            kind: match check.kind {
                                CheckKind::Assert => FindingKind::FailedAssert,
                                CheckKind::Report => FindingKind::SuccessfulReport,
                            },
                            severity: check.severity(),
                            message: check.message.clone(),
                            location: node_location(&node),
                            test: check.test.clone(),
                            rule_context: rule.context.clone(),
                            pattern: Some(pattern.label().to_string())
                                .filter(|label| !label.is_empty()),
                            check_id: check.id.clone(),
                        });
                    }
                }
            }
        }

        info!(
            document,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validated document"
        );
        Ok(report)
    }
}

fn xpath_context(doc: &Document, schema: &Schema) -> Result<Context> {
    let ctx = Context::new(doc).map_err(|_| SchematronError::Xpath {
        expression: "<new context>".to_string(),
    })?;
    for ns in &schema.namespaces {
        ctx.register_namespace(&ns.prefix, &ns.uri)
            .map_err(|_| SchematronError::Xpath {
                expression: format!("xmlns:{}", ns.prefix),
            })?;
    }
    Ok(ctx)
}

/// Evaluate a boolean test with `node` as the XPath context node.
///
/// The test is wrapped into a predicate on `self::node()`: the node set is
/// non-empty exactly when `boolean(test)` is true. This keeps evaluation on
/// the node-set API and forces boolean semantics even for numeric tests.
fn eval_test(ctx: &mut Context, node: &Node, test: &str) -> Result<bool> {
    let expression = format!("self::node()[boolean({test})]");
    let nodes = ctx
        .findnodes(&expression, Some(node))
        .map_err(|_| SchematronError::Xpath {
            expression: test.to_string(),
        })?;
    Ok(!nodes.is_empty())
}

/// Make a rule context absolute so it can be evaluated from the document
/// root. Relative steps get a `//` prefix; top-level unions are split so
/// each branch is prefixed on its own. Parenthesized expressions are left
/// alone (`//(` is not a valid step) and evaluate from the document node.
pub(crate) fn absolute_context(context: &str) -> String {
    split_top_level_union(context)
        .into_iter()
        .map(|part| {
            let part = part.trim();
            if part.starts_with('/') || part.starts_with('(') {
                part.to_string()
            } else {
                format!("//{part}")
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Split on `|` outside of quotes, brackets and parentheses.
fn split_top_level_union(expression: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in expression.char_indices() {
        match (quote, ch) {
            (Some(q), _) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, '|') if depth == 0 => {
                parts.push(&expression[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&expression[start..]);
    parts
}

/// Build a `/root[1]/child[2]` style path for a matched node.
fn node_location(node: &Node) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if n.get_type() != Some(NodeType::ElementNode) {
            current = n.get_parent();
            continue;
        }
        let name = n.get_name();
        let index = sibling_index(&n, &name);
        segments.push(format!("{name}[{index}]"));
        current = n.get_parent();
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// 1-based position among same-name element siblings.
fn sibling_index(node: &Node, name: &str) -> usize {
    let Some(parent) = node.get_parent() else {
        return 1;
    };
    let mut index = 1;
    for sibling in parent.get_child_nodes() {
        if sibling == *node {
            break;
        }
        if sibling.get_type() == Some(NodeType::ElementNode) && sibling.get_name() == name {
            index += 1;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::absolute_context;

    #[test]
    fn relative_contexts_are_anchored() {
        assert_eq!(absolute_context("book"), "//book");
        assert_eq!(absolute_context("/library"), "/library");
        assert_eq!(absolute_context("lib:book/lib:title"), "//lib:book/lib:title");
    }

    #[test]
    fn parenthesized_contexts_stay_unanchored() {
        assert_eq!(absolute_context("(a|b)[1]"), "(a|b)[1]");
        assert_eq!(
            absolute_context("(root/item)[1] | extra"),
            "(root/item)[1] | //extra"
        );
    }

    #[test]
    fn unions_are_split_at_the_top_level() {
        assert_eq!(absolute_context("book | journal"), "//book | //journal");
        assert_eq!(
            absolute_context("/a | b[c | d]"),
            "/a | //b[c | d]"
        );
        assert_eq!(
            absolute_context("entry[@kind = 'a|b']"),
            "//entry[@kind = 'a|b']"
        );
    }
}
