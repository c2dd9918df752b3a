//! Output layout: which file and route each object lands on.
//!
//! Modules and classes (any object owning non-argument members) are
//! containers and get `<dir>/index.md`; other objects get
//! `<parent dir>/<slug>.md`. Arguments have no file of their own and share
//! their owner's placement. Objects pinned to a page take the page's
//! placement instead, but still reserve their structural slug so the
//! layout does not depend on the page configuration.

use std::collections::{HashMap, HashSet};

use nuxtdoc_model::{ApiTree, ObjectId, ObjectKind, qualified_to_path, to_slug};

use crate::RenderError;

/// Where an object is written and linked to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// File path relative to the content root, `/`-separated.
    pub file: String,
    /// Site route: `dir/` for index files, `dir/name` otherwise.
    pub route: String,
    /// Anchor inside the file, for objects pinned to a page.
    pub anchor: Option<String>,
}

impl Placement {
    /// Route without trailing slash, used to detect colliding outputs.
    pub(crate) fn route_key(&self) -> &str {
        self.route.trim_end_matches('/')
    }
}

/// Object visited during the tree walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub id: ObjectId,
    /// Nesting depth, 0 for top-level modules.
    pub depth: usize,
}

/// Depth-first, pre-order walk of the tree.
///
/// # Errors
///
/// Returns [`RenderError::CycleDetected`] if a qualified name is reached
/// twice, which only happens for malformed raw-parts trees.
pub fn walk(tree: &ApiTree) -> Result<Vec<Visit>, RenderError> {
    let mut visited: HashSet<&str> = HashSet::with_capacity(tree.len());
    let mut order = Vec::with_capacity(tree.len());
    let mut stack: Vec<Visit> = tree
        .roots()
        .iter()
        .rev()
        .map(|&id| Visit { id, depth: 0 })
        .collect();

    while let Some(visit) = stack.pop() {
        let name = tree.get(visit.id).qualified_name.as_str();
        if !visited.insert(name) {
            return Err(RenderError::CycleDetected {
                qualified_name: name.to_owned(),
            });
        }
        order.push(visit);
        stack.extend(tree.members(visit.id).iter().rev().map(|&id| Visit {
            id,
            depth: visit.depth + 1,
        }));
    }
    Ok(order)
}

/// Computed placements for a whole tree.
#[derive(Debug, Default)]
pub struct Layout {
    visits: Vec<Visit>,
    depths: HashMap<ObjectId, usize>,
    placements: HashMap<ObjectId, Placement>,
    /// Objects that own a structural file, in walk order.
    structural: Vec<ObjectId>,
}

impl Layout {
    /// Assign files and routes.
    ///
    /// `output` is the directory (as segments) below the content root that
    /// receives API files; `pinned` maps objects to the page placements
    /// that override their structural file.
    #[must_use]
    pub fn build(
        tree: &ApiTree,
        visits: Vec<Visit>,
        output: &[String],
        pinned: &HashMap<ObjectId, Placement>,
    ) -> Self {
        let mut dirs: HashMap<ObjectId, Vec<String>> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();
        let mut layout = Self {
            depths: visits.iter().map(|v| (v.id, v.depth)).collect(),
            ..Self::default()
        };

        for visit in &visits {
            let id = visit.id;
            let object = tree.get(id);
            let parent = tree.parent(id);

            if object.kind == ObjectKind::Argument {
                if let Some(owner) = parent.and_then(|p| layout.placements.get(&p)).cloned() {
                    layout.placements.insert(id, owner);
                }
                continue;
            }

            let (parent_dir, base) = match parent.and_then(|p| dirs.get(&p)) {
                Some(dir) => (dir.clone(), to_slug(&object.name)),
                None => {
                    // Top-level module (dotted names nest directories)
                    let mut segments = qualified_to_path(&object.qualified_name);
                    let base = segments.pop().unwrap_or_else(|| to_slug(&object.name));
                    let mut dir = output.to_vec();
                    dir.extend(segments);
                    (dir, base)
                }
            };

            let container = tree.is_container(id);
            let slug = unique_slug(&mut taken, &parent_dir, &base, container);
            let mut segments = parent_dir;
            segments.push(slug);
            let joined = segments.join("/");

            let structural = if container {
                dirs.insert(id, segments);
                Placement {
                    file: format!("{joined}/index.md"),
                    route: format!("{joined}/"),
                    anchor: None,
                }
            } else {
                Placement {
                    file: format!("{joined}.md"),
                    route: joined,
                    anchor: None,
                }
            };

            if let Some(page) = pinned.get(&id) {
                layout.placements.insert(id, page.clone());
            } else {
                layout.placements.insert(id, structural);
                layout.structural.push(id);
            }
        }

        layout.visits = visits;
        layout
    }

    /// Placement of an object.
    #[must_use]
    pub fn placement(&self, id: ObjectId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// Nesting depth of an object (module = 0).
    #[must_use]
    pub fn depth(&self, id: ObjectId) -> usize {
        self.depths.get(&id).copied().unwrap_or_default()
    }

    /// Walk order used to build the layout.
    #[must_use]
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Objects that own a structural file, in walk order.
    #[must_use]
    pub fn structural(&self) -> &[ObjectId] {
        &self.structural
    }

    /// Whether an object is rendered on a page instead of its own file.
    #[must_use]
    pub fn is_pinned(&self, id: ObjectId) -> bool {
        self.placements.get(&id).is_some_and(|p| p.anchor.is_some())
    }
}

/// Pick a sibling-unique slug: `name`, `name-2`, `name-3`, ...
///
/// Leaves may not be called `index`, which would shadow the directory's
/// own index file.
fn unique_slug(taken: &mut HashSet<String>, dir: &[String], base: &str, container: bool) -> String {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir.join("/"))
    };
    let reserved = |slug: &str| !container && slug == "index";

    let mut candidate = base.to_owned();
    let mut n = 1;
    while reserved(&candidate) || taken.contains(&format!("{prefix}{candidate}")) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    taken.insert(format!("{prefix}{candidate}"));
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuxtdoc_model::ApiObject;
    use pretty_assertions::assert_eq;

    fn tree() -> ApiTree {
        ApiTree::from_json(
            r#"[{"name": "app", "members": [
                {"name": "App", "kind": "class", "members": [
                    {"name": "run", "kind": "method", "members": [
                        {"name": "port", "kind": "argument"}
                    ]},
                    {"name": "Run", "kind": "method"},
                    {"name": "index", "kind": "function"}
                ]},
                {"name": "app", "kind": "function"},
                {"name": "VERSION", "kind": "variable"}
            ]}]"#,
        )
        .unwrap()
    }

    fn build(tree: &ApiTree, output: &[&str]) -> Layout {
        let output: Vec<String> = output.iter().map(|s| (*s).to_owned()).collect();
        Layout::build(tree, walk(tree).unwrap(), &output, &HashMap::new())
    }

    fn file_of(layout: &Layout, tree: &ApiTree, qn: &str) -> String {
        layout.placement(tree.lookup(qn).unwrap()).unwrap().file.clone()
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let tree = tree();
        let names: Vec<(String, usize)> = walk(&tree)
            .unwrap()
            .iter()
            .map(|v| (tree.get(v.id).qualified_name.clone(), v.depth))
            .collect();
        assert_eq!(names[0], ("app".to_owned(), 0));
        assert_eq!(names[1], ("app.App".to_owned(), 1));
        assert_eq!(names[2], ("app.App.run".to_owned(), 2));
        assert_eq!(names[3], ("app.App.run.port".to_owned(), 3));
        assert_eq!(names.len(), tree.len());
    }

    #[test]
    fn test_container_and_leaf_files() {
        let tree = tree();
        let layout = build(&tree, &[]);
        assert_eq!(file_of(&layout, &tree, "app"), "app/index.md");
        assert_eq!(file_of(&layout, &tree, "app.App"), "app/app/index.md");
        assert_eq!(file_of(&layout, &tree, "app.App.run"), "app/app/run.md");
        assert_eq!(file_of(&layout, &tree, "app.VERSION"), "app/version.md");
        let route = &layout.placement(tree.lookup("app.App").unwrap()).unwrap().route;
        assert_eq!(route, "app/app/");
    }

    #[test]
    fn test_slug_collisions_are_suffixed_in_member_order() {
        let tree = tree();
        let layout = build(&tree, &[]);
        assert_eq!(file_of(&layout, &tree, "app.App.Run"), "app/app/run-2.md");
        // Class `App` took `app`, so function `app` is second
        assert_eq!(file_of(&layout, &tree, "app.app"), "app/app-2.md");
    }

    #[test]
    fn test_leaf_named_index_is_renamed() {
        let tree = tree();
        let layout = build(&tree, &[]);
        assert_eq!(file_of(&layout, &tree, "app.App.index"), "app/app/index-2.md");
    }

    #[test]
    fn test_arguments_share_owner_placement() {
        let tree = tree();
        let layout = build(&tree, &[]);
        assert_eq!(file_of(&layout, &tree, "app.App.run.port"), "app/app/run.md");
        assert!(!layout.structural().contains(&tree.lookup("app.App.run.port").unwrap()));
    }

    #[test]
    fn test_output_dir_prefix() {
        let tree = tree();
        let layout = build(&tree, &["api", "ref"]);
        assert_eq!(file_of(&layout, &tree, "app.App.run"), "api/ref/app/app/run.md");
    }

    #[test]
    fn test_pinned_object_skips_structural_file() {
        let tree = tree();
        let class = tree.lookup("app.App").unwrap();
        let page = Placement {
            file: "guide.md".to_owned(),
            route: "guide".to_owned(),
            anchor: Some("app.app".to_owned()),
        };
        let pinned = HashMap::from([(class, page.clone())]);
        let layout = Layout::build(&tree, walk(&tree).unwrap(), &[], &pinned);

        assert_eq!(layout.placement(class), Some(&page));
        assert!(layout.is_pinned(class));
        assert!(!layout.structural().contains(&class));
        // Members keep their structural location
        assert_eq!(file_of(&layout, &tree, "app.App.run"), "app/app/run.md");
    }

    #[test]
    fn test_dotted_root_module() {
        let tree = ApiTree::from_json(r#"[{"name": "pkg.core", "members": []}]"#).unwrap();
        let layout = build(&tree, &[]);
        assert_eq!(file_of(&layout, &tree, "pkg.core"), "pkg/core/index.md");
    }

    #[test]
    fn test_walk_detects_cycle() {
        let objects = vec![
            ApiObject {
                name: "a".to_owned(),
                qualified_name: "a".to_owned(),
                kind: ObjectKind::Module,
                ..Default::default()
            },
            ApiObject {
                name: "b".to_owned(),
                qualified_name: "a.b".to_owned(),
                kind: ObjectKind::Class,
                ..Default::default()
            },
        ];
        let tree = ApiTree::from_raw_parts(
            objects,
            vec![vec![ObjectId::new(1)], vec![ObjectId::new(0)]],
            vec![ObjectId::new(0)],
        )
        .unwrap();
        let err = walk(&tree).unwrap_err();
        assert!(matches!(err, RenderError::CycleDetected { ref qualified_name } if qualified_name == "a"));
    }
}
