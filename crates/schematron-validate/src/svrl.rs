//! SVRL report serialization and extraction.

use libxml::parser::Parser;
use libxml::xpath::Context;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use schematron_model::{Result, SVRL_NS, Schema, SchematronError, collapse_whitespace};

use crate::report::{FindingKind, ValidationReport};

/// Serialize a validation report as an SVRL document.
pub fn to_svrl(report: &ValidationReport, schema: &Schema) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("svrl:schematron-output");
    root.push_attribute(("xmlns:svrl", SVRL_NS));
    if let Some(title) = &schema.title {
        root.push_attribute(("title", title.as_str()));
    }
    root.push_attribute(("schemaVersion", ""));
    emit(&mut writer, Event::Start(root))?;

    for ns in &schema.namespaces {
        let mut decl = BytesStart::new("svrl:ns-prefix-in-attribute-values");
        decl.push_attribute(("prefix", ns.prefix.as_str()));
        decl.push_attribute(("uri", ns.uri.as_str()));
        emit(&mut writer, Event::Empty(decl))?;
    }

    let mut last_pattern: Option<&str> = None;
    for finding in &report.findings {
        let pattern = finding.pattern.as_deref();
        if pattern != last_pattern
            && let Some(name) = pattern
        {
            let mut active = BytesStart::new("svrl:active-pattern");
            active.push_attribute(("name", name));
            emit(&mut writer, Event::Empty(active))?;
        }
        last_pattern = pattern;

        let element = match finding.kind {
            FindingKind::FailedAssert => "svrl:failed-assert",
            FindingKind::SuccessfulReport => "svrl:successful-report",
        };
        let mut entry = BytesStart::new(element);
        entry.push_attribute(("test", finding.test.as_str()));
        entry.push_attribute(("location", finding.location.as_str()));
        if let Some(id) = &finding.check_id {
            entry.push_attribute(("id", id.as_str()));
        }
        emit(&mut writer, Event::Start(entry))?;
        emit(&mut writer, Event::Start(BytesStart::new("svrl:text")))?;
        emit(&mut writer, Event::Text(BytesText::new(&finding.message)))?;
        emit(&mut writer, Event::End(BytesEnd::new("svrl:text")))?;
        emit(&mut writer, Event::End(BytesEnd::new(element)))?;
    }

    emit(
        &mut writer,
        Event::End(BytesEnd::new("svrl:schematron-output")),
    )?;
    String::from_utf8(writer.into_inner()).map_err(|e| SchematronError::Render(e.to_string()))
}

/// Extract the message of every `svrl:failed-assert` in an SVRL document.
///
/// Works on reports produced by [`to_svrl`] as well as on the output of the
/// compiled stylesheet run through an external XSLT processor. A clean
/// report yields an empty list.
pub fn failed_assert_messages(svrl_xml: &str) -> Result<Vec<String>> {
    let doc = Parser::default()
        .parse_string(svrl_xml)
        .map_err(|e| SchematronError::Parse(format!("{e:?}")))?;
    let mut ctx = Context::new(&doc).map_err(|_| SchematronError::Xpath {
        expression: "<new context>".to_string(),
    })?;
    ctx.register_namespace("svrl", SVRL_NS)
        .map_err(|_| SchematronError::Xpath {
            expression: "xmlns:svrl".to_string(),
        })?;

    let expression = "//svrl:failed-assert";
    let nodes = ctx
        .findnodes(expression, None)
        .map_err(|_| SchematronError::Xpath {
            expression: expression.to_string(),
        })?;
    Ok(nodes
        .iter()
        .map(|node| collapse_whitespace(&node.get_content()))
        .collect())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SchematronError::Render(e.to_string()))
}
