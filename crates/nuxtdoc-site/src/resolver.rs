//! Cross-reference resolution against the output layout.

use nuxtdoc_model::{ApiTree, ObjectId};
use nuxtdoc_renderer::{LinkResolver, relative_path};

use crate::layout::Layout;

/// Finds referenced objects and computes links to their files.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tree: &'a ApiTree,
    layout: &'a Layout,
    /// `Some(base_url)` when absolute links are enabled.
    base_url: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(tree: &'a ApiTree, layout: &'a Layout, base_url: Option<&'a str>) -> Self {
        Self {
            tree,
            layout,
            base_url,
        }
    }

    /// Find the object `reference` names as seen from `scope`.
    ///
    /// The scope and then each of its ancestors is tried as a prefix, so
    /// the nearest enclosing match wins. A fully qualified name is tried
    /// last. Results are never cached: the same text may name different
    /// objects from different scopes.
    #[must_use]
    pub fn find(&self, scope: ObjectId, reference: &str) -> Option<ObjectId> {
        let reference = reference.trim().trim_start_matches('.');
        if reference.is_empty() {
            return None;
        }
        self.tree
            .ancestors(scope)
            .into_iter()
            .find_map(|ancestor| {
                let prefix = &self.tree.get(ancestor).qualified_name;
                self.tree.lookup(&format!("{prefix}.{reference}"))
            })
            .or_else(|| self.tree.lookup(reference))
    }

    /// Link from the file at `from_file` to `target`.
    ///
    /// Relative links point at the target's markdown file, so joining one
    /// with the referring file's directory lands on that file. Absolute
    /// links use the site route under `base_url`.
    #[must_use]
    pub fn link(&self, from_file: &str, target: ObjectId) -> Option<String> {
        let placement = self.layout.placement(target)?;
        let fragment = placement
            .anchor
            .as_deref()
            .map(|anchor| format!("#{anchor}"))
            .unwrap_or_default();

        if let Some(base) = self.base_url {
            let base = base.trim_end_matches('/');
            return Some(format!("{base}/{}{fragment}", placement.route));
        }
        if placement.file == from_file && !fragment.is_empty() {
            return Some(fragment);
        }
        Some(format!("{}{fragment}", relative_path(from_file, &placement.file)))
    }

    /// Resolver bound to the file being written.
    #[must_use]
    pub fn scoped<'b>(&self, from_file: &'b str) -> ScopedResolver<'b>
    where
        'a: 'b,
    {
        ScopedResolver {
            resolver: *self,
            from_file,
        }
    }
}

/// [`Resolver`] bound to one output file.
#[derive(Debug, Clone, Copy)]
pub struct ScopedResolver<'a> {
    resolver: Resolver<'a>,
    from_file: &'a str,
}

impl LinkResolver for ScopedResolver<'_> {
    fn resolve(&self, scope: ObjectId, reference: &str) -> Option<String> {
        let target = self.resolver.find(scope, reference)?;
        self.resolver.link(self.from_file, target)
    }
}
