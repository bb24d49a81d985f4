//! Schematron parsing on top of the libxml2 DOM.

use std::path::Path;

use libxml::parser::Parser;
use libxml::tree::{Document, Node, NodeType};
use tracing::debug;

use crate::error::{Result, SchematronError};
use crate::schema::{
    Check, CheckKind, ISO_SCHEMATRON_NS, LEGACY_SCHEMATRON_NS, NsDecl, Pattern, Phase, Rule,
    Schema,
};

impl Schema {
    /// Parse a Schematron ruleset from a file on disk.
    pub fn parse_file(path: &Path) -> Result<Schema> {
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
        let schema = Schema::parse_str(&xml)?;
        debug!(
            path = %path.display(),
            patterns = schema.patterns.len(),
            rules = schema.rule_count(),
            "parsed schematron ruleset"
        );
        Ok(schema)
    }

    /// Parse a Schematron ruleset from an in-memory XML string.
    pub fn parse_str(xml: &str) -> Result<Schema> {
        let doc = Parser::default()
            .parse_string(xml)
            .map_err(|e| SchematronError::Parse(format!("{e:?}")))?;
        parse_document(&doc)
    }
}

fn parse_document(doc: &Document) -> Result<Schema> {
    let root = doc
        .get_root_element()
        .ok_or_else(|| SchematronError::Parse("document has no root element".to_string()))?;
    if !is_schematron(&root) || root.get_name() != "schema" {
        return Err(SchematronError::Parse(format!(
            "root element <{}> is not a schematron <schema>",
            root.get_name()
        )));
    }
    if let Some(binding) = root.get_attribute("queryBinding") {
        let normalized = binding.to_ascii_lowercase();
        if normalized != "xslt" && normalized != "xslt1" {
            return Err(SchematronError::UnsupportedQueryBinding(binding));
        }
    }

    let mut schema = Schema {
        title: None,
        default_phase: root.get_attribute("defaultPhase"),
        namespaces: Vec::new(),
        phases: Vec::new(),
        patterns: Vec::new(),
    };

    for child in element_children(&root) {
        match child.get_name().as_str() {
            "title" => schema.title = non_empty(collapse_whitespace(&child.get_content())),
            "ns" => schema.namespaces.push(parse_ns(&child)?),
            "phase" => schema.phases.push(parse_phase(&child)?),
            "pattern" => schema.patterns.push(parse_pattern(&child)?),
            "let" => {
                return Err(SchematronError::UnsupportedConstruct(
                    "<let> variables".to_string(),
                ));
            }
            "include" => {
                return Err(SchematronError::UnsupportedConstruct(
                    "<include> resolution".to_string(),
                ));
            }
            // p, diagnostics and other documentation elements carry no
            // validation semantics here.
            _ => {}
        }
    }

    if schema.patterns.is_empty() {
        return Err(SchematronError::EmptySchema);
    }
    Ok(schema)
}

fn parse_ns(node: &Node) -> Result<NsDecl> {
    let prefix = node
        .get_attribute("prefix")
        .ok_or(SchematronError::MissingAttribute {
            element: "ns",
            attribute: "prefix",
        })?;
    let uri = node
        .get_attribute("uri")
        .ok_or(SchematronError::MissingAttribute {
            element: "ns",
            attribute: "uri",
        })?;
    Ok(NsDecl { prefix, uri })
}

fn parse_phase(node: &Node) -> Result<Phase> {
    let id = node
        .get_attribute("id")
        .ok_or(SchematronError::MissingAttribute {
            element: "phase",
            attribute: "id",
        })?;
    let mut active = Vec::new();
    for child in element_children(node) {
        if child.get_name() == "active"
            && let Some(pattern) = child.get_attribute("pattern")
        {
            active.push(pattern);
        }
    }
    Ok(Phase { id, active })
}

fn parse_pattern(node: &Node) -> Result<Pattern> {
    if node.get_attribute("abstract").as_deref() == Some("true") {
        return Err(SchematronError::UnsupportedConstruct(
            "abstract patterns".to_string(),
        ));
    }
    let mut pattern = Pattern {
        id: node.get_attribute("id"),
        // Schematron 1.5 carried the title in a name attribute.
        title: node.get_attribute("name"),
        rules: Vec::new(),
    };
    for child in element_children(node) {
        match child.get_name().as_str() {
            "title" => pattern.title = non_empty(collapse_whitespace(&child.get_content())),
            "rule" => pattern.rules.push(parse_rule(&child)?),
            "let" => {
                return Err(SchematronError::UnsupportedConstruct(
                    "<let> variables".to_string(),
                ));
            }
            _ => {}
        }
    }
    Ok(pattern)
}

fn parse_rule(node: &Node) -> Result<Rule> {
    if node.get_attribute("abstract").as_deref() == Some("true") {
        return Err(SchematronError::UnsupportedConstruct(
            "abstract rules".to_string(),
        ));
    }
    let context = node
        .get_attribute("context")
        .ok_or(SchematronError::MissingAttribute {
            element: "rule",
            attribute: "context",
        })?;
    let mut rule = Rule {
        id: node.get_attribute("id"),
        context,
        checks: Vec::new(),
    };
    for child in element_children(node) {
        match child.get_name().as_str() {
            "assert" => rule.checks.push(parse_check(&child, CheckKind::Assert)?),
            "report" => rule.checks.push(parse_check(&child, CheckKind::Report)?),
            "extends" => {
                return Err(SchematronError::UnsupportedConstruct(
                    "<extends> rules".to_string(),
                ));
            }
            "let" => {
                return Err(SchematronError::UnsupportedConstruct(
                    "<let> variables".to_string(),
                ));
            }
            _ => {}
        }
    }
    Ok(rule)
}

fn parse_check(node: &Node, kind: CheckKind) -> Result<Check> {
    let element = match kind {
        CheckKind::Assert => "assert",
        CheckKind::Report => "report",
    };
    let test = node
        .get_attribute("test")
        .filter(|t| !t.trim().is_empty())
        .ok_or(SchematronError::MissingAttribute {
            element,
            attribute: "test",
        })?;
    Ok(Check {
        kind,
        test,
        id: node.get_attribute("id"),
        role: node.get_attribute("role"),
        flag: node.get_attribute("flag"),
        message: collapse_whitespace(&node.get_content()),
    })
}

/// Element children of a node that live in a Schematron namespace.
fn element_children(node: &Node) -> Vec<Node> {
    node.get_child_nodes()
        .into_iter()
        .filter(|child| {
            child.get_type() == Some(NodeType::ElementNode) && is_schematron(child)
        })
        .collect()
}

fn is_schematron(node: &Node) -> bool {
    match node.get_namespace() {
        Some(ns) => {
            let href = ns.get_href();
            href == ISO_SCHEMATRON_NS || href == LEGACY_SCHEMATRON_NS
        }
        None => false,
    }
}

/// Collapse interior whitespace runs so multi-line assertion messages
/// compare stably.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::collapse_whitespace;

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(
            collapse_whitespace("  Expected EventType\n      to be 'audit'  "),
            "Expected EventType to be 'audit'"
        );
        assert_eq!(collapse_whitespace("\n \t"), "");
    }
}
