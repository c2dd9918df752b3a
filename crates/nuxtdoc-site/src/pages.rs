//! Page structure merging.
//!
//! Configured pages are placed first; objects they select are pinned to
//! them and rendered there instead of at their structural location.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use nuxtdoc_config::{ConfigError, PageEntry};
use nuxtdoc_model::{ApiObject, ApiTree, ObjectId, ObjectKind};
use nuxtdoc_renderer::{Formatter, Navigation, PageMeta};

use crate::RenderError;
use crate::layout::{Layout, Placement, Visit};
use crate::renderer::RenderContext;
use crate::selection::select;
use crate::writer::RenderedFile;

/// A page entry with its resolved location and selection.
#[derive(Debug)]
struct PlannedPage<'a> {
    entry: &'a PageEntry,
    placement: Placement,
    ordinal: i64,
    /// Nesting depth among pages.
    level: usize,
    selected: Vec<ObjectId>,
}

/// Reconciles configured pages with the API tree.
#[derive(Debug, Default)]
pub struct PageMerger<'a> {
    pages: Vec<PlannedPage<'a>>,
}

impl<'a> PageMerger<'a> {
    /// Place every page and expand its content patterns.
    ///
    /// Pages are numbered in configuration order (children right after
    /// their parent) unless they set their own `order`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Page`] for invalid patterns and
    /// [`ConfigError::Conflict`] when two pages land on the same file.
    pub fn plan(
        entries: &'a [PageEntry],
        tree: &ApiTree,
        visits: &[Visit],
    ) -> Result<Self, ConfigError> {
        let mut merger = Self::default();
        let mut counter = 0;
        merger.place(entries, &[], 0, &mut counter, tree, visits)?;
        merger.check_pages()?;
        Ok(merger)
    }

    fn place(
        &mut self,
        entries: &'a [PageEntry],
        parent_dir: &[String],
        level: usize,
        counter: &mut i64,
        tree: &ApiTree,
        visits: &[Visit],
    ) -> Result<(), ConfigError> {
        for entry in entries {
            *counter += 1;
            let mut dir = parent_dir.to_vec();
            if let Some(directory) = &entry.directory {
                dir.extend(
                    directory
                        .split('/')
                        .filter(|s| !s.is_empty() && *s != ".")
                        .map(str::to_owned),
                );
            }

            let ext = entry.extension();
            let placement = if !entry.children.is_empty() {
                dir.push(entry.name.clone());
                let joined = dir.join("/");
                Placement {
                    file: format!("{joined}/index{ext}"),
                    route: format!("{joined}/"),
                    anchor: None,
                }
            } else {
                let prefix: String = dir.iter().map(|s| format!("{s}/")).collect();
                if entry.name == "index" {
                    Placement {
                        file: format!("{prefix}index{ext}"),
                        route: prefix,
                        anchor: None,
                    }
                } else {
                    Placement {
                        file: format!("{prefix}{}{ext}", entry.name),
                        route: format!("{prefix}{}", entry.name),
                        anchor: None,
                    }
                }
            };

            self.pages.push(PlannedPage {
                entry,
                placement,
                ordinal: entry.order.unwrap_or(*counter),
                level,
                selected: select(&entry.patterns()?, tree, visits),
            });

            if !entry.children.is_empty() {
                self.place(&entry.children, &dir, level + 1, counter, tree, visits)?;
            }
        }
        Ok(())
    }

    fn check_pages(&self) -> Result<(), ConfigError> {
        let mut files: HashMap<&str, &str> = HashMap::new();
        let mut routes: HashMap<&str, &str> = HashMap::new();
        for page in &self.pages {
            let name = page.entry.name.as_str();
            let conflict = files
                .insert(&page.placement.file, name)
                .or_else(|| routes.insert(page.placement.route_key(), name));
            if let Some(first) = conflict {
                return Err(ConfigError::Conflict {
                    first: first.to_owned(),
                    second: name.to_owned(),
                    path: page.placement.file.clone(),
                });
            }
        }
        Ok(())
    }

    /// Page placements for selected objects; the first page selecting an
    /// object wins. Arguments are never pinned.
    #[must_use]
    pub fn pinned(&self, tree: &ApiTree) -> HashMap<ObjectId, Placement> {
        let mut pinned = HashMap::new();
        for page in &self.pages {
            for &id in &page.selected {
                let object = tree.get(id);
                if object.kind == ObjectKind::Argument {
                    continue;
                }
                pinned.entry(id).or_insert_with(|| Placement {
                    anchor: Some(Formatter::anchor(object)),
                    ..page.placement.clone()
                });
            }
        }
        pinned
    }

    /// Reject pages that would overwrite a generated API file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conflict`] naming the page and the object.
    pub fn check_structural(&self, tree: &ApiTree, layout: &Layout) -> Result<(), ConfigError> {
        let mut claimed: HashMap<&str, &str> = HashMap::new();
        for page in &self.pages {
            claimed.insert(&page.placement.file, &page.entry.name);
            claimed.insert(page.placement.route_key(), &page.entry.name);
        }

        for &id in layout.structural() {
            let Some(placement) = layout.placement(id) else {
                continue;
            };
            let hit = claimed
                .get(placement.file.as_str())
                .or_else(|| claimed.get(placement.route_key()));
            if let Some(page) = hit {
                return Err(ConfigError::Conflict {
                    first: (*page).to_owned(),
                    second: tree.get(id).qualified_name.clone(),
                    path: placement.file.clone(),
                });
            }
        }
        Ok(())
    }

    /// Produce the files of all pages, in configuration order.
    ///
    /// Static pages embed their hero, features and `source` file verbatim.
    /// Content pages add one anchored block per selected object in tree
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Source`] for unreadable source files and
    /// serialization errors from formatting.
    pub(crate) fn assign(
        &self,
        ctx: &mut RenderContext<'_>,
        project_dir: &Path,
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let mut files = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            files.push(page_file(ctx, page, project_dir)?);
        }
        Ok(files)
    }
}

fn page_file(
    ctx: &mut RenderContext<'_>,
    page: &PlannedPage<'_>,
    project_dir: &Path,
) -> Result<RenderedFile, RenderError> {
    let entry = page.entry;
    let tree = ctx.tree;
    let formatter = ctx.formatter;
    let mut parts = Vec::new();

    if let Some(hero) = &entry.hero {
        parts.push(formatter.format_hero(hero));
    }
    if !entry.features.is_empty() {
        parts.push(formatter.format_features(&entry.features));
    }
    if let Some(source) = &entry.source {
        let path = project_dir.join(source);
        let text = std::fs::read_to_string(&path).map_err(|source| RenderError::Source {
            page: entry.name.clone(),
            path: path.clone(),
            source,
        })?;
        parts.push(text);
    }

    let blocks: Vec<ObjectId> = page
        .selected
        .iter()
        .copied()
        .filter(|&id| tree.get(id).kind != ObjectKind::Argument)
        .collect();
    for &id in &blocks {
        let level = (ctx.layout.depth(id) + 1).min(6);
        parts.push(ctx.block(id, level, &page.placement.file, true)?);
    }

    let primary = primary_object(tree, &blocks);
    let title = entry.display_title().to_owned();
    let meta = PageMeta::new(
        title.clone(),
        primary.and_then(ApiObject::summary).map(str::to_owned),
        Navigation {
            title,
            icon: primary
                .map_or(formatter.icons().page_icon(), |o| formatter.icons().icon(o.kind))
                .to_owned(),
            level: page.level,
            order: Some(page.ordinal),
        },
    );

    let mut layers = vec![&entry.frontmatter];
    if let Some(object) = primary {
        layers.push(&object.frontmatter);
    }

    Ok(RenderedFile {
        path: page.placement.file.clone(),
        frontmatter: ctx.frontmatter(&meta, &layers)?,
        body: ctx.body(&parts),
    })
}

/// The single selected object not nested in another selected object.
fn primary_object<'t>(tree: &'t ApiTree, blocks: &[ObjectId]) -> Option<&'t ApiObject> {
    let set: HashSet<ObjectId> = blocks.iter().copied().collect();
    let mut tops = blocks
        .iter()
        .filter(|&&id| tree.parent(id).is_none_or(|p| !set.contains(&p)));
    match (tops.next(), tops.next()) {
        (Some(&id), None) => Some(tree.get(id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::walk;
    use pretty_assertions::assert_eq;

    fn tree() -> ApiTree {
        ApiTree::from_json(
            r#"[{"name": "pkg", "members": [
                {"name": "Core", "kind": "class", "members": [
                    {"name": "go", "kind": "method", "members": [
                        {"name": "fast", "kind": "argument"}
                    ]}
                ]},
                {"name": "util", "kind": "function"}
            ]}]"#,
        )
        .unwrap()
    }

    fn pages(toml_text: &str) -> Vec<PageEntry> {
        #[derive(serde::Deserialize)]
        struct Pages {
            pages: Vec<PageEntry>,
        }
        toml::from_str::<Pages>(toml_text).unwrap().pages
    }

    fn placements(merger: &PageMerger<'_>) -> Vec<(String, String, i64, usize)> {
        merger
            .pages
            .iter()
            .map(|p| {
                (
                    p.placement.file.clone(),
                    p.placement.route.clone(),
                    p.ordinal,
                    p.level,
                )
            })
            .collect()
    }

    #[test]
    fn test_page_placement_and_ordinals() {
        let tree = tree();
        let entries = pages(
            r#"
            [[pages]]
            name = "index"

            [[pages]]
            name = "guide"
            directory = "docs"

            [[pages]]
            name = "api"
            order = 10
            [[pages.children]]
            name = "core"
            contents = ["pkg.Core"]
            [[pages.children]]
            name = "extra"
            extension = ".mdx"
            "#,
        );
        let merger = PageMerger::plan(&entries, &tree, &walk(&tree).unwrap()).unwrap();
        assert_eq!(
            placements(&merger),
            vec![
                ("index.md".to_owned(), String::new(), 1, 0),
                ("docs/guide.md".to_owned(), "docs/guide".to_owned(), 2, 0),
                ("api/index.md".to_owned(), "api/".to_owned(), 10, 0),
                ("api/core.md".to_owned(), "api/core".to_owned(), 4, 1),
                ("api/extra.mdx".to_owned(), "api/extra".to_owned(), 5, 1),
            ]
        );
    }

    #[test]
    fn test_pinned_first_page_wins_and_skips_arguments() {
        let tree = tree();
        let entries = pages(
            r#"
            [[pages]]
            name = "core"
            contents = ["pkg.Core.*"]

            [[pages]]
            name = "all"
            contents = ["*"]
            "#,
        );
        let merger = PageMerger::plan(&entries, &tree, &walk(&tree).unwrap()).unwrap();
        let pinned = merger.pinned(&tree);

        let go = tree.lookup("pkg.Core.go").unwrap();
        assert_eq!(pinned[&go].route, "core");
        assert_eq!(pinned[&go].anchor.as_deref(), Some("pkg.core.go"));
        assert_eq!(pinned[&tree.lookup("pkg.util").unwrap()].route, "all");
        assert!(!pinned.contains_key(&tree.lookup("pkg.Core.go.fast").unwrap()));
    }

    #[test]
    fn test_pages_on_same_file_conflict() {
        let tree = tree();
        let entries = pages(
            r#"
            [[pages]]
            name = "guide"
            [[pages]]
            name = "guide"
            title = "Again"
            "#,
        );
        let err = PageMerger::plan(&entries, &tree, &walk(&tree).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Conflict { ref path, .. } if path == "guide.md"));
    }

    #[test]
    fn test_page_shadowing_api_route_conflicts() {
        let tree = tree();
        let entries = pages(
            r#"
            [[pages]]
            name = "pkg"
            "#,
        );
        let visits = walk(&tree).unwrap();
        let merger = PageMerger::plan(&entries, &tree, &visits).unwrap();
        let layout = Layout::build(&tree, visits, &[], &merger.pinned(&tree));
        let err = merger.check_structural(&tree, &layout).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Conflict { ref first, ref second, .. } if first == "pkg" && second == "pkg"
        ));
    }

    #[test]
    fn test_primary_object() {
        let tree = tree();
        let core = tree.lookup("pkg.Core").unwrap();
        let go = tree.lookup("pkg.Core.go").unwrap();
        let util = tree.lookup("pkg.util").unwrap();

        assert_eq!(primary_object(&tree, &[core, go]).map(|o| o.name.as_str()), Some("Core"));
        assert!(primary_object(&tree, &[core, util]).is_none());
        assert!(primary_object(&tree, &[]).is_none());
    }
}
