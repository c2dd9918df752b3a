//! Docstring body processing.
//!
//! Docstrings arrive in the processed form where each section starts with a
//! `**Section**:` line followed by a blank line. Argument and attribute
//! lists are re-emitted as structured blocks; with components enabled the
//! remaining known sections become MDC components. Sections that do not
//! parse are kept verbatim.

use std::sync::LazyLock;

use nuxtdoc_config::ComponentRole;
use nuxtdoc_model::ObjectId;
use regex::Regex;

use crate::crossref::rewrite_references;
use crate::formatter::{FieldItem, Formatter};
use crate::mdc::{self, CodeBlock};
use crate::scan::{Protect, rewrite_unprotected};
use crate::LinkResolver;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(?P<name>[A-Za-z][A-Za-z ]*)\*\*:\s*$").unwrap());

static FIELD_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- `(?P<spec>[^`]+)`\s*(?:-|:)\s*(?P<desc>.*)$").unwrap());

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?P<marker>```|~~~)\s*(?P<lang>[\w+-]*)").unwrap());

/// Known docstring section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SectionKind {
    Arguments,
    Variables,
    Returns,
    Raises,
    Examples,
    Notes,
    Warnings,
    SeeAlso,
}

impl SectionKind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim() {
            "Arguments" | "Parameters" | "Args" => Self::Arguments,
            "Attributes" | "Variables" => Self::Variables,
            "Returns" | "Return" => Self::Returns,
            "Raises" => Self::Raises,
            "Examples" | "Example" => Self::Examples,
            "Notes" | "Note" => Self::Notes,
            "Warnings" | "Warning" => Self::Warnings,
            "See Also" => Self::SeeAlso,
            _ => return None,
        })
    }

    /// Sections whose body is a list of items.
    fn is_list(self) -> bool {
        matches!(self, Self::Arguments | Self::Variables | Self::Raises)
    }
}

enum Chunk<'a> {
    Text(Vec<&'a str>),
    Section {
        kind: SectionKind,
        header: &'a str,
        body: Vec<&'a str>,
    },
}

/// Result of processing one docstring.
pub(crate) struct ProcessedDocstring {
    pub(crate) markup: String,
    /// Whether an arguments section was found.
    pub(crate) has_arguments: bool,
}

/// Run the full docstring pipeline: references, escaping, sections,
/// blockquote mode.
pub(crate) fn process(
    formatter: &Formatter,
    docstring: &str,
    scope: ObjectId,
    links: &dyn LinkResolver,
    unresolved: &mut Vec<String>,
) -> Result<ProcessedDocstring, serde_yaml::Error> {
    let text = prose(formatter, docstring, scope, links, unresolved);

    let chunks = split_sections(&text);
    let has_arguments = chunks
        .iter()
        .any(|c| matches!(c, Chunk::Section { kind: SectionKind::Arguments, .. }));

    let mut parts = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let rendered = match chunk {
            Chunk::Text(lines) => {
                let text = lines.join("\n");
                if formatter.use_mdc {
                    group_code_blocks(formatter, &text)
                } else {
                    text
                }
            }
            Chunk::Section { kind, header, body } => {
                convert_section(formatter, *kind, header, body)?
            }
        };
        let rendered = rendered.trim_matches('\n');
        if !rendered.trim().is_empty() {
            parts.push(rendered.to_owned());
        }
    }

    let mut markup = parts.join("\n\n");
    if formatter.options.docstrings_as_blockquote {
        markup = markup
            .lines()
            .map(|line| if line.is_empty() { ">".to_owned() } else { format!("> {line}") })
            .collect::<Vec<_>>()
            .join("\n");
    }
    Ok(ProcessedDocstring {
        markup,
        has_arguments,
    })
}

/// Rewrite references and escape HTML in free text.
pub(crate) fn prose(
    formatter: &Formatter,
    text: &str,
    scope: ObjectId,
    links: &dyn LinkResolver,
    unresolved: &mut Vec<String>,
) -> String {
    let text = rewrite_references(text.trim(), scope, links, unresolved);
    if formatter.options.escape_html {
        escape_html(&text)
    } else {
        text
    }
}

/// Escape `&`, `<` and `>` outside code and blockquote lines.
pub(crate) fn escape_html(text: &str) -> String {
    rewrite_unprotected(text, Protect::Code, |segment, offset| {
        let mut out = String::with_capacity(segment.len());
        let mut line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let mut pos = offset;
        for line in segment.split_inclusive('\n') {
            if text[line_start..].trim_start().starts_with('>') {
                out.push_str(line);
            } else {
                for c in line.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        _ => out.push(c),
                    }
                }
            }
            pos += line.len();
            line_start = pos;
        }
        out
    })
}

fn split_sections(text: &str) -> Vec<Chunk<'_>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut chunks = Vec::new();
    let mut current = Chunk::Text(Vec::new());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if FENCE.is_match(line) {
            in_fence = !in_fence;
        }

        if !in_fence
            && let Some(caps) = SECTION_HEADER.captures(line)
            && let Some(kind) = SectionKind::from_name(&caps["name"])
            && lines.get(i + 1).is_none_or(|next| next.trim().is_empty())
        {
            chunks.push(std::mem::replace(
                &mut current,
                Chunk::Section {
                    kind,
                    header: line,
                    body: Vec::new(),
                },
            ));
            i += 2;
            continue;
        }

        let ends_list = matches!(&current, Chunk::Section { kind, .. } if kind.is_list())
            && !line.trim().is_empty()
            && !line.starts_with("- ")
            && !line.starts_with(char::is_whitespace);
        if ends_list {
            chunks.push(std::mem::replace(&mut current, Chunk::Text(vec![line])));
        } else {
            match &mut current {
                Chunk::Section { body, .. } => body.push(line),
                Chunk::Text(text) => text.push(line),
            }
        }
        i += 1;
    }
    chunks.push(current);
    chunks
}

fn verbatim(header: &str, body: &[&str]) -> String {
    format!("{header}\n\n{}", body.join("\n").trim_matches('\n'))
}

fn convert_section(
    formatter: &Formatter,
    kind: SectionKind,
    header: &str,
    body: &[&str],
) -> Result<String, serde_yaml::Error> {
    let tags = &formatter.components;
    let content = body.join("\n").trim_matches('\n').to_owned();

    if kind == SectionKind::Arguments || kind == SectionKind::Variables {
        let Some(items) = parse_fields(body) else {
            return Ok(verbatim(header, body));
        };
        let block = if kind == SectionKind::Arguments {
            formatter.format_arguments(&items)?
        } else {
            formatter.format_variables(&items)?
        };
        return Ok(if formatter.use_mdc {
            block
        } else {
            format!("{header}\n\n{block}")
        });
    }

    if !formatter.use_mdc {
        return Ok(verbatim(header, body));
    }

    Ok(match kind {
        SectionKind::Returns => mdc::block(tags.tag(ComponentRole::Returns), &[], &content),
        SectionKind::Raises => match parse_fields(body) {
            Some(items) => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| format!("**{}**: {}", item.name, item.content))
                    .collect();
                mdc::block_with_yaml(
                    tags.tag(ComponentRole::Raises),
                    &CalloutProps { kind: "error" },
                    &lines.join("\n"),
                )?
            }
            None => verbatim(header, body),
        },
        SectionKind::Examples => convert_examples(formatter, header, body),
        SectionKind::Notes => mdc::alert(tags.tag(ComponentRole::Notes), "info", Some("Note"), &content),
        SectionKind::Warnings => mdc::alert(
            tags.tag(ComponentRole::Warnings),
            "warning",
            Some("Warning"),
            &content,
        ),
        SectionKind::SeeAlso => mdc::card(tags.tag(ComponentRole::SeeAlso), "See Also", &content),
        SectionKind::Arguments | SectionKind::Variables => verbatim(header, body),
    })
}

#[derive(serde::Serialize)]
struct CalloutProps {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Parse ``- `name: type` - text`` items with indented continuations.
fn parse_fields(body: &[&str]) -> Option<Vec<FieldItem>> {
    let mut items: Vec<FieldItem> = Vec::new();
    for line in body {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = FIELD_ITEM.captures(line) {
            let (name, type_name) = match caps["spec"].split_once(':') {
                Some((name, ty)) => (name.trim(), ty.trim()),
                None => (caps["spec"].trim(), ""),
            };
            items.push(FieldItem {
                name: name.to_owned(),
                type_name: type_name.to_owned(),
                content: caps["desc"].trim().to_owned(),
            });
        } else if line.starts_with(char::is_whitespace) {
            let item = items.last_mut()?;
            if !item.content.is_empty() {
                item.content.push(' ');
            }
            item.content.push_str(line.trim());
        } else {
            return None;
        }
    }
    if items.is_empty() { None } else { Some(items) }
}

/// A fenced block found in a line list.
struct Fence {
    start: usize,
    end: usize,
    block: CodeBlock,
}

fn find_fences(lines: &[&str]) -> Vec<Fence> {
    let mut fences = Vec::new();
    let mut open: Option<(usize, &str, String)> = None;
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = FENCE.captures(line) else {
            continue;
        };
        match open.take() {
            None => {
                let marker = caps.name("marker").map_or("```", |m| m.as_str());
                open = Some((i, marker, caps["lang"].to_owned()));
            }
            Some((start, marker, language)) if line.trim() == marker => {
                fences.push(Fence {
                    start,
                    end: i,
                    block: CodeBlock {
                        language,
                        code: lines[start + 1..i].join("\n"),
                    },
                });
            }
            still_open => open = still_open,
        }
    }
    fences
}

/// Wrap runs of two or more fenced blocks separated by at most one blank
/// line in a code group.
fn group_code_blocks(formatter: &Formatter, text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let fences = find_fences(&lines);
    if fences.len() < 2 {
        return text.to_owned();
    }

    let mut groups: Vec<Vec<&Fence>> = Vec::new();
    for fence in &fences {
        let joins_previous = groups.last().and_then(|g| g.last()).is_some_and(|prev| {
            let between = &lines[prev.end + 1..fence.start];
            between.len() <= 1 && between.iter().all(|l| l.trim().is_empty())
        });
        match groups.last_mut() {
            Some(group) if joins_previous => group.push(fence),
            _ => groups.push(vec![fence]),
        }
    }

    let tag = formatter.components.tag(ComponentRole::CodeGroup);
    let mut out: Vec<String> = Vec::new();
    let mut cursor = 0;
    for group in groups.iter().filter(|g| g.len() > 1) {
        let (first, last) = (group[0], group[group.len() - 1]);
        out.extend(lines[cursor..first.start].iter().map(|l| (*l).to_owned()));
        let blocks: Vec<CodeBlock> = group.iter().map(|f| f.block.clone()).collect();
        out.push(mdc::code_group(tag, &blocks));
        cursor = last.end + 1;
    }
    out.extend(lines[cursor..].iter().map(|l| (*l).to_owned()));
    out.join("\n")
}

fn convert_examples(formatter: &Formatter, header: &str, body: &[&str]) -> String {
    let fences = find_fences(body);
    if fences.is_empty() {
        return verbatim(header, body);
    }

    let in_fence = |i: usize| fences.iter().any(|f| (f.start..=f.end).contains(&i));
    let prose: Vec<&str> = body
        .iter()
        .enumerate()
        .filter(|(i, line)| !in_fence(*i) && !line.trim().is_empty())
        .map(|(_, line)| *line)
        .collect();
    let blocks: Vec<CodeBlock> = fences.iter().map(|f| f.block.clone()).collect();
    let tags = &formatter.components;

    if prose.is_empty() {
        return mdc::code_group(tags.tag(ComponentRole::Examples), &blocks);
    }
    if fences.len() == 1 {
        return format!(
            "{}\n\n{}",
            prose.join("\n"),
            mdc::code_group(tags.tag(ComponentRole::Examples), &blocks)
        );
    }

    // One tab per code block, carrying the prose that precedes it
    let mut pieces: Vec<(String, String)> = Vec::new();
    let mut cursor = 0;
    for (n, fence) in fences.iter().enumerate() {
        let end = if n + 1 == fences.len() { body.len() } else { fence.end + 1 };
        let content = body[cursor..end].join("\n");
        pieces.push((format!("Example {}", n + 1), content.trim_matches('\n').to_owned()));
        cursor = end;
    }
    mdc::tabs(tags.tag(ComponentRole::Tabs), &pieces)
}
