//! MDC (Markdown Components) syntax builders.
//!
//! Block components use `::tag` fences, nested blocks add one colon per
//! level, and inline components use a single colon. Props are either
//! inline attributes (`{type="info"}`) or a YAML section between `---`
//! lines.

use serde::Serialize;

use crate::util::attr_value;

/// A fenced code block inside a code group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info-string language (may be empty).
    pub language: String,
    /// Code without the fences.
    pub code: String,
}

impl CodeBlock {
    fn render(&self) -> String {
        let code = self.code.trim_end_matches('\n');
        if self.language.is_empty() {
            format!("```\n{code}\n```")
        } else {
            // Tab label shown by code groups
            format!("```{0} [{0}]\n{code}\n```", self.language)
        }
    }
}

/// Inline attribute list, `{a="1" b="2"}`; empty when there are no props.
pub fn inline_props(props: &[(&str, &str)]) -> String {
    if props.is_empty() {
        return String::new();
    }
    let attrs: Vec<String> = props
        .iter()
        .map(|(key, value)| format!("{key}=\"{}\"", attr_value(value)))
        .collect();
    format!("{{{}}}", attrs.join(" "))
}

/// Block component with optional inline props.
pub fn block(tag: &str, props: &[(&str, &str)], content: &str) -> String {
    let content = content.trim_matches('\n');
    if content.is_empty() {
        format!("::{tag}{}\n::", inline_props(props))
    } else {
        format!("::{tag}{}\n{content}\n::", inline_props(props))
    }
}

/// Block component with YAML props.
///
/// # Errors
///
/// Returns an error if the props cannot be serialized.
pub fn block_with_yaml<T: Serialize>(
    tag: &str,
    props: &T,
    content: &str,
) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(props)?;
    let content = content.trim_matches('\n');
    let mut out = format!("::{tag}\n---\n{yaml}---\n");
    if !content.is_empty() {
        out.push_str(content);
        out.push('\n');
    }
    out.push_str("::");
    Ok(out)
}

/// Alert with a type and optional title.
pub fn alert(tag: &str, kind: &str, title: Option<&str>, content: &str) -> String {
    let mut props = vec![("type", kind)];
    if let Some(title) = title {
        props.push(("title", title));
    }
    block(tag, &props, content)
}

/// Group of code blocks shown as tabs.
pub fn code_group(tag: &str, blocks: &[CodeBlock]) -> String {
    let body: Vec<String> = blocks.iter().map(CodeBlock::render).collect();
    format!("::{tag}\n{}\n::", body.join("\n"))
}

/// Tabs component; each tab is a nested labelled `div`.
pub fn tabs(tag: &str, tabs: &[(String, String)]) -> String {
    let mut out = format!(":::{tag}\n");
    for (label, content) in tabs {
        out.push_str(&format!(
            "::div{}\n{}\n::\n",
            inline_props(&[("label", label)]),
            content.trim_matches('\n')
        ));
    }
    out.push_str(":::");
    out
}

/// Inline button component.
pub fn button(tag: &str, label: &str, to: &str, variant: &str) -> String {
    format!(
        ":{tag}[{label}]{}",
        inline_props(&[("to", to), ("variant", variant)])
    )
}

/// Card with a title.
pub fn card(tag: &str, title: &str, content: &str) -> String {
    block(tag, &[("title", title)], content)
}

/// Feature card with optional icon.
pub fn feature(tag: &str, title: &str, icon: Option<&str>, description: &str) -> String {
    let mut props = vec![("title", title)];
    if let Some(icon) = icon.filter(|i| !i.is_empty()) {
        props.push(("icon", icon));
    }
    block(tag, &props, description)
}

/// Hero section wrapping a heading, description and buttons.
pub fn hero(tag: &str, content: &str) -> String {
    block(tag, &[], content)
}
