//! Locate markdown regions that text rewrites must not touch.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;

/// Inline code directly preceded by a Sphinx role stays rewritable.
static ROLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":[a-z]+:$").unwrap());

/// Which constructs count as protected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Protect {
    /// Code spans and code blocks.
    Code,
    /// Code, existing links, images and raw HTML.
    CodeLinksHtml,
}

/// Byte ranges of protected regions, sorted and non-overlapping.
pub(crate) fn protected_ranges(text: &str, protect: Protect) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        let keep = match event {
            Event::Start(Tag::CodeBlock(_)) => true,
            Event::Code(_) => !ROLE_PREFIX.is_match(&text[..range.start]),
            Event::Start(Tag::Link { .. } | Tag::Image { .. })
            | Event::Html(_)
            | Event::InlineHtml(_) => protect == Protect::CodeLinksHtml,
            _ => false,
        };
        if keep {
            ranges.push(range);
        }
    }

    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Apply `rewrite` to every unprotected segment, copying the rest verbatim.
///
/// The callback receives the segment and its byte offset in `text`.
pub(crate) fn rewrite_unprotected(
    text: &str,
    protect: Protect,
    mut rewrite: impl FnMut(&str, usize) -> String,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in protected_ranges(text, protect) {
        if range.start > cursor {
            out.push_str(&rewrite(&text[cursor..range.start], cursor));
        }
        out.push_str(&text[range.clone()]);
        cursor = range.end;
    }
    if cursor < text.len() {
        out.push_str(&rewrite(&text[cursor..], cursor));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_code_is_protected() {
        let text = "use `a < b` here";
        let ranges = protected_ranges(text, Protect::Code);
        assert_eq!(ranges.len(), 1);
        assert_eq!(&text[ranges[0].clone()], "`a < b`");
    }

    #[test]
    fn test_fenced_block_is_protected() {
        let text = "Intro\n\n```python\nx = 1 < 2\n```\n\nOutro";
        let ranges = protected_ranges(text, Protect::Code);
        assert_eq!(ranges.len(), 1);
        assert!(text[ranges[0].clone()].contains("x = 1 < 2"));
    }

    #[test]
    fn test_role_code_span_is_not_protected() {
        let text = "See :class:`App` and `App`.";
        let ranges = protected_ranges(text, Protect::Code);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, text.rfind("`App`").unwrap());
    }

    #[test]
    fn test_links_protected_only_when_requested() {
        let text = "Go to [the app](#App) now";
        assert!(protected_ranges(text, Protect::Code).is_empty());
        assert_eq!(protected_ranges(text, Protect::CodeLinksHtml).len(), 1);
    }

    #[test]
    fn test_rewrite_unprotected_segments() {
        let out = rewrite_unprotected("a `b` c", Protect::Code, |s, _| s.to_uppercase());
        assert_eq!(out, "A `b` C");
    }
}
