//! Table of contents for generated bodies.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::util::heading_level_to_num;

/// Build a nested list of links to the headings of `body`, up to
/// `max_depth`. Returns `None` when there are no such headings.
pub fn table_of_contents(body: &str, max_depth: u8) -> Option<String> {
    let mut headings: Vec<(u8, String)> = Vec::new();
    let mut current: Option<(u8, String)> = None;

    let stripped = blank_component_fences(body);
    for event in Parser::new_ext(&stripped, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((heading_level_to_num(level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current.take()
                    && level <= max_depth
                    && !title.trim().is_empty()
                {
                    headings.push((level, title.trim().to_owned()));
                }
            }
            _ => {}
        }
    }

    let min_level = headings.iter().map(|(level, _)| *level).min()?;
    let lines: Vec<String> = headings
        .iter()
        .map(|(level, title)| {
            let indent = "  ".repeat(usize::from(level - min_level));
            format!("{indent}- [{title}](#{})", heading_slug(title))
        })
        .collect();
    Some(lines.join("\n"))
}

/// Replace MDC fence lines and YAML prop sections with blank lines.
///
/// A `::tag` line followed by `---` would otherwise read as a setext
/// heading.
fn blank_component_fences(body: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut after_open = false;
    let mut in_props = false;

    for line in body.lines() {
        let trimmed = line.trim();
        if in_props {
            in_props = trimmed != "---";
            out.push("");
            continue;
        }
        if after_open && trimmed == "---" {
            in_props = true;
            after_open = false;
            out.push("");
            continue;
        }
        after_open = false;
        if trimmed.starts_with("::") {
            after_open = trimmed.trim_start_matches(':').starts_with(|c: char| c.is_ascii_alphabetic());
            out.push("");
            continue;
        }
        out.push(line);
    }
    out.join("\n")
}

/// Heading id as generated by the site: lowercase, spaces to dashes,
/// punctuation dropped.
fn heading_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        } else if c.is_whitespace() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug
}
