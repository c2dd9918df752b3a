//! Content pattern expansion.

use std::collections::HashSet;

use nuxtdoc_config::ContentPattern;
use nuxtdoc_model::{ApiTree, ObjectId};

use crate::layout::Visit;

/// Objects selected by any of `patterns`, in tree order, without duplicates.
///
/// An exact name that matches nothing selects nothing.
#[must_use]
pub fn select(patterns: &[ContentPattern], tree: &ApiTree, visits: &[Visit]) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    visits
        .iter()
        .map(|visit| visit.id)
        .filter(|&id| {
            let name = &tree.get(id).qualified_name;
            patterns.iter().any(|p| p.matches(name)) && seen.insert(id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::walk;
    use pretty_assertions::assert_eq;

    fn tree() -> ApiTree {
        ApiTree::from_json(
            r#"[
                {"name": "pkg", "members": [
                    {"name": "Core", "kind": "class", "members": [
                        {"name": "go", "kind": "method"}
                    ]},
                    {"name": "util", "kind": "function"}
                ]},
                {"name": "pkgx", "members": [{"name": "other", "kind": "function"}]}
            ]"#,
        )
        .unwrap()
    }

    fn names(tree: &ApiTree, patterns: &[&str]) -> Vec<String> {
        let patterns: Vec<ContentPattern> = patterns
            .iter()
            .map(|p| ContentPattern::parse(p).unwrap())
            .collect();
        select(&patterns, tree, &walk(tree).unwrap())
            .into_iter()
            .map(|id| tree.get(id).qualified_name.clone())
            .collect()
    }

    #[test]
    fn test_descendant_wildcard() {
        let tree = tree();
        assert_eq!(
            names(&tree, &["pkg.*"]),
            vec!["pkg.Core", "pkg.Core.go", "pkg.util"]
        );
    }

    #[test]
    fn test_star_selects_whole_tree() {
        let tree = tree();
        assert_eq!(names(&tree, &["*"]).len(), tree.len());
    }

    #[test]
    fn test_exact_name() {
        let tree = tree();
        assert_eq!(names(&tree, &["pkg.util"]), vec!["pkg.util"]);
        assert!(names(&tree, &["pkg.missing"]).is_empty());
    }

    #[test]
    fn test_overlapping_patterns_keep_tree_order() {
        let tree = tree();
        assert_eq!(
            names(&tree, &["pkg.util", "pkg.Core", "pkg.util"]),
            vec!["pkg.Core", "pkg.util"]
        );
    }
}
