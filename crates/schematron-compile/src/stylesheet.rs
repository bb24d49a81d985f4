//! XSLT 1.0 code generation.
//!
//! The generated stylesheet, applied to an instance document, walks the whole
//! tree once per active pattern (one template mode per pattern) and emits an
//! SVRL report: `svrl:failed-assert` for every assert whose test is false on
//! a matched context node, `svrl:successful-report` for every report whose
//! test is true.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use schematron_model::{Check, CheckKind, Pattern, Result, SVRL_NS, Schema, SchematronError};

const XSL_NS: &str = "http://www.w3.org/1999/XSL/Transform";

/// Mode name used by the location helper template.
const FULL_PATH_MODE: &str = "schematron-get-full-path";

type XmlWriter = Writer<Vec<u8>>;

/// Render `schema` into an XSLT 1.0 stylesheet, restricted to the patterns
/// active in `phase` (see [`Schema::active_patterns`]).
pub fn compile_with_phase(schema: &Schema, phase: Option<&str>) -> Result<String> {
    let patterns = schema.active_patterns(phase)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("xsl:stylesheet");
    root.push_attribute(("version", "1.0"));
    root.push_attribute(("xmlns:xsl", XSL_NS));
    root.push_attribute(("xmlns:svrl", SVRL_NS));
    for ns in &schema.namespaces {
        root.push_attribute((format!("xmlns:{}", ns.prefix).as_str(), ns.uri.as_str()));
    }
    emit(&mut writer, Event::Start(root))?;

    let mut output = BytesStart::new("xsl:output");
    output.push_attribute(("method", "xml"));
    output.push_attribute(("indent", "yes"));
    emit(&mut writer, Event::Empty(output))?;

    write_root_template(&mut writer, schema, &patterns)?;
    write_full_path_template(&mut writer)?;
    for (index, pattern) in patterns.iter().enumerate() {
        write_pattern_templates(&mut writer, pattern, index)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("xsl:stylesheet")))?;
    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| SchematronError::Render(e.to_string()))
}

/// The `match="/"` entry point: opens `svrl:schematron-output` and applies
/// one pass per pattern.
fn write_root_template(
    writer: &mut XmlWriter,
    schema: &Schema,
    patterns: &[&Pattern],
) -> Result<()> {
    let mut template = BytesStart::new("xsl:template");
    template.push_attribute(("match", "/"));
    emit(writer, Event::Start(template))?;

    let mut svrl_root = BytesStart::new("svrl:schematron-output");
    if let Some(title) = &schema.title {
        svrl_root.push_attribute(("title", title.as_str()));
    }
    svrl_root.push_attribute(("schemaVersion", ""));
    emit(writer, Event::Start(svrl_root))?;

    for ns in &schema.namespaces {
        let mut decl = BytesStart::new("svrl:ns-prefix-in-attribute-values");
        decl.push_attribute(("prefix", ns.prefix.as_str()));
        decl.push_attribute(("uri", ns.uri.as_str()));
        emit(writer, Event::Empty(decl))?;
    }

    for (index, pattern) in patterns.iter().enumerate() {
        let mut active = BytesStart::new("svrl:active-pattern");
        if let Some(id) = &pattern.id {
            active.push_attribute(("id", id.as_str()));
        }
        if !pattern.label().is_empty() {
            active.push_attribute(("name", pattern.label()));
        }
        emit(writer, Event::Empty(active))?;

        let mut apply = BytesStart::new("xsl:apply-templates");
        apply.push_attribute(("select", "/"));
        apply.push_attribute(("mode", mode_name(index).as_str()));
        emit(writer, Event::Empty(apply))?;
    }

    emit(writer, Event::End(BytesEnd::new("svrl:schematron-output")))?;
    emit(writer, Event::End(BytesEnd::new("xsl:template")))?;
    Ok(())
}

/// Helper producing `/root[1]/child[2]/...` location strings for findings.
fn write_full_path_template(writer: &mut XmlWriter) -> Result<()> {
    let mut template = BytesStart::new("xsl:template");
    template.push_attribute(("match", "*"));
    template.push_attribute(("mode", FULL_PATH_MODE));
    emit(writer, Event::Start(template))?;

    let mut parent = BytesStart::new("xsl:apply-templates");
    parent.push_attribute(("select", "parent::*"));
    parent.push_attribute(("mode", FULL_PATH_MODE));
    emit(writer, Event::Empty(parent))?;

    write_text_instruction(writer, "/")?;
    write_value_of(writer, "name()")?;
    write_text_instruction(writer, "[")?;
    write_value_of(
        writer,
        "count(preceding-sibling::*[name() = name(current())]) + 1",
    )?;
    write_text_instruction(writer, "]")?;

    emit(writer, Event::End(BytesEnd::new("xsl:template")))?;
    Ok(())
}

fn write_pattern_templates(writer: &mut XmlWriter, pattern: &Pattern, index: usize) -> Result<()> {
    let mode = mode_name(index);
    for (rule_index, rule) in pattern.rules.iter().enumerate() {
        // Descending priority keeps lexical rule order: within a pattern the
        // first matching rule claims the node.
        let priority = 1000 - rule_index as i64;
        let mut template = BytesStart::new("xsl:template");
        template.push_attribute(("match", rule.context.as_str()));
        template.push_attribute(("priority", priority.to_string().as_str()));
        template.push_attribute(("mode", mode.as_str()));
        emit(writer, Event::Start(template))?;

        let mut fired = BytesStart::new("svrl:fired-rule");
        fired.push_attribute(("context", rule.context.as_str()));
        if let Some(id) = &rule.id {
            fired.push_attribute(("id", id.as_str()));
        }
        emit(writer, Event::Empty(fired))?;

        for check in &rule.checks {
            match check.kind {
                CheckKind::Assert => write_assert(writer, check)?,
                CheckKind::Report => write_report(writer, check)?,
            }
        }

        let mut descend = BytesStart::new("xsl:apply-templates");
        descend.push_attribute(("select", "*"));
        descend.push_attribute(("mode", mode.as_str()));
        emit(writer, Event::Empty(descend))?;
        emit(writer, Event::End(BytesEnd::new("xsl:template")))?;
    }

    // Mode defaults: swallow text, keep descending through unmatched elements.
    let mut text_template = BytesStart::new("xsl:template");
    text_template.push_attribute(("match", "text()"));
    text_template.push_attribute(("mode", mode.as_str()));
    text_template.push_attribute(("priority", "-1"));
    emit(writer, Event::Empty(text_template))?;

    let mut element_template = BytesStart::new("xsl:template");
    element_template.push_attribute(("match", "*"));
    element_template.push_attribute(("mode", mode.as_str()));
    element_template.push_attribute(("priority", "-2"));
    emit(writer, Event::Start(element_template))?;
    let mut descend = BytesStart::new("xsl:apply-templates");
    descend.push_attribute(("select", "*"));
    descend.push_attribute(("mode", mode.as_str()));
    emit(writer, Event::Empty(descend))?;
    emit(writer, Event::End(BytesEnd::new("xsl:template")))?;
    Ok(())
}

/// `<assert>` compiles to a choose: quiet when the test holds, otherwise a
/// `svrl:failed-assert` with location and message.
fn write_assert(writer: &mut XmlWriter, check: &Check) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("xsl:choose")))?;

    let mut when = BytesStart::new("xsl:when");
    when.push_attribute(("test", check.test.as_str()));
    emit(writer, Event::Empty(when))?;

    emit(writer, Event::Start(BytesStart::new("xsl:otherwise")))?;
    write_svrl_entry(writer, "svrl:failed-assert", check)?;
    emit(writer, Event::End(BytesEnd::new("xsl:otherwise")))?;
    emit(writer, Event::End(BytesEnd::new("xsl:choose")))?;
    Ok(())
}

/// `<report>` fires on a true test.
fn write_report(writer: &mut XmlWriter, check: &Check) -> Result<()> {
    let mut cond = BytesStart::new("xsl:if");
    cond.push_attribute(("test", check.test.as_str()));
    emit(writer, Event::Start(cond))?;
    write_svrl_entry(writer, "svrl:successful-report", check)?;
    emit(writer, Event::End(BytesEnd::new("xsl:if")))?;
    Ok(())
}

fn write_svrl_entry(writer: &mut XmlWriter, element: &str, check: &Check) -> Result<()> {
    let mut entry = BytesStart::new(element);
    entry.push_attribute(("test", check.test.as_str()));
    if let Some(id) = &check.id {
        entry.push_attribute(("id", id.as_str()));
    }
    if let Some(role) = &check.role {
        entry.push_attribute(("role", role.as_str()));
    }
    if let Some(flag) = &check.flag {
        entry.push_attribute(("flag", flag.as_str()));
    }
    emit(writer, Event::Start(entry))?;

    let mut location = BytesStart::new("xsl:attribute");
    location.push_attribute(("name", "location"));
    emit(writer, Event::Start(location))?;
    let mut path = BytesStart::new("xsl:apply-templates");
    path.push_attribute(("select", "."));
    path.push_attribute(("mode", FULL_PATH_MODE));
    emit(writer, Event::Empty(path))?;
    emit(writer, Event::End(BytesEnd::new("xsl:attribute")))?;

    emit(writer, Event::Start(BytesStart::new("svrl:text")))?;
    emit(writer, Event::Text(BytesText::new(&check.message)))?;
    emit(writer, Event::End(BytesEnd::new("svrl:text")))?;

    emit(writer, Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_text_instruction(writer: &mut XmlWriter, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("xsl:text")))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new("xsl:text")))?;
    Ok(())
}

fn write_value_of(writer: &mut XmlWriter, select: &str) -> Result<()> {
    let mut value_of = BytesStart::new("xsl:value-of");
    value_of.push_attribute(("select", select));
    emit(writer, Event::Empty(value_of))?;
    Ok(())
}

fn mode_name(index: usize) -> String {
    format!("M{index}")
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SchematronError::Render(e.to_string()))
}
