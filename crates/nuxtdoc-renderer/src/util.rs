//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Compute a relative URL from one output path to another (RFC 3986).
///
/// Both `from` and `to` are slash-separated paths without leading slash,
/// either file paths (`app/app/index.md`) or routes. Per RFC 3986 the last
/// segment of `from` is the current document and the base directory is
/// everything before it. A trailing slash on `from` marks an index route
/// whose segments are all directory.
///
/// # Examples
///
/// ```
/// use nuxtdoc_renderer::relative_path;
///
/// assert_eq!(relative_path("app/app/index.md", "app/config/index.md"), "../config/index.md");
/// assert_eq!(relative_path("app/app/run", "app/app/"), "./");
/// assert_eq!(relative_path("app/", "app/app/run"), "app/run");
/// assert_eq!(relative_path("", "pkg/mod/"), "pkg/mod");
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_dir.len() - common);
    let down = to_segs[common..].join("/");

    let result = format!("{ups}{down}");
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Make text safe for a single markdown table cell.
pub(crate) fn escape_table_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Quote a value for an MDC inline attribute.
pub(crate) fn attr_value(value: &str) -> String {
    value.replace('"', "&quot;")
}
