//! Cross-reference rewriting.
//!
//! Recognizes Sphinx roles (`` :class:`Name` ``) and hash references
//! (`#Name`, `#pkg.Name`) in docstring prose. Code, existing links and raw
//! HTML are left alone.

use std::sync::LazyLock;

use nuxtdoc_model::ObjectId;
use regex::{Captures, Regex};

use crate::LinkResolver;
use crate::scan::{Protect, rewrite_unprotected};

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m):(?:class|func|meth|mod|attr|data|obj|exc):`(?P<role>~?[A-Za-z_][\w.]*)`|(?P<pre>^|[^\w&/#\]`])#(?P<hash>[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)",
    )
    .unwrap()
});

/// Rewrite references found in `text`.
///
/// Resolved references become `[Name](link)`, unresolved ones become the
/// bare name and are appended to `unresolved` (once each).
pub(crate) fn rewrite_references(
    text: &str,
    scope: ObjectId,
    links: &dyn LinkResolver,
    unresolved: &mut Vec<String>,
) -> String {
    rewrite_unprotected(text, Protect::CodeLinksHtml, |segment, _| {
        REFERENCE
            .replace_all(segment, |caps: &Captures<'_>| {
                let (prefix, target, display) = if let Some(role) = caps.name("role") {
                    let role = role.as_str();
                    match role.strip_prefix('~') {
                        // `~pkg.Name` shows only the last component
                        Some(target) => {
                            (String::new(), target, target.rsplit('.').next().unwrap_or(target))
                        }
                        None => (String::new(), role, role),
                    }
                } else {
                    let pre = caps.name("pre").map_or("", |m| m.as_str());
                    let hash = caps.name("hash").map_or("", |m| m.as_str());
                    (pre.to_owned(), hash, hash)
                };

                match links.resolve(scope, target) {
                    Some(link) => format!("{prefix}[{display}]({link})"),
                    None => {
                        if !unresolved.iter().any(|r| r == target) {
                            unresolved.push(target.to_owned());
                        }
                        format!("{prefix}{display}")
                    }
                }
            })
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullResolver;
    use pretty_assertions::assert_eq;

    struct MapResolver;

    impl LinkResolver for MapResolver {
        fn resolve(&self, _scope: ObjectId, reference: &str) -> Option<String> {
            match reference {
                "App" => Some("app/".to_owned()),
                "app.App.run" => Some("app/run".to_owned()),
                _ => None,
            }
        }
    }

    fn rewrite(text: &str) -> (String, Vec<String>) {
        let mut unresolved = Vec::new();
        let out = rewrite_references(text, ObjectId::new(0), &MapResolver, &mut unresolved);
        (out, unresolved)
    }

    #[test]
    fn test_hash_reference_resolved() {
        let (out, missing) = rewrite("Create an #App first.");
        assert_eq!(out, "Create an [App](app/) first.");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_dotted_hash_reference() {
        let (out, _) = rewrite("Then call #app.App.run.");
        assert_eq!(out, "Then call [app.App.run](app/run).");
    }

    #[test]
    fn test_sphinx_role_resolved() {
        let (out, _) = rewrite("Returns an :class:`App` instance.");
        assert_eq!(out, "Returns an [App](app/) instance.");
    }

    #[test]
    fn test_sphinx_role_tilde_shows_last_component() {
        let (out, _) = rewrite("See :meth:`~app.App.run`.");
        assert_eq!(out, "See [run](app/run).");
    }

    #[test]
    fn test_unresolved_becomes_plain_text_once() {
        let (out, missing) = rewrite("#Unknown and :class:`Unknown` again");
        assert_eq!(out, "Unknown and Unknown again");
        assert_eq!(missing, vec!["Unknown".to_owned()]);
    }

    #[test]
    fn test_code_is_left_alone() {
        let text = "Use `#App` or\n\n```python\nx = 1  #App\n```\n";
        let (out, missing) = rewrite(text);
        assert_eq!(out, text);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_existing_links_and_headings_untouched() {
        let text = "# Title\n\nSee [here](#App) and a#b.";
        let (out, _) = rewrite(text);
        assert_eq!(out, text);
    }

    #[test]
    fn test_null_resolver_strips_syntax() {
        let mut unresolved = Vec::new();
        let out = rewrite_references("#App", ObjectId::new(0), &NullResolver, &mut unresolved);
        assert_eq!(out, "App");
        assert_eq!(unresolved, vec!["App".to_owned()]);
    }
}
