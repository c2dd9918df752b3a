//! API object tree.
//!
//! Objects are stored in a flat arena with parent/member relationships
//! tracked by [`ObjectId`] indices. Members are owned by their parent's
//! member list; parent access is a non-owning index lookup, so upward
//! navigation never creates reference cycles.
//!
//! # Input
//!
//! Trees are usually built from the JSON produced by the upstream
//! loader/processor pipeline (see [`ObjectSpec`]). Callers that already hold
//! an arena can use [`ApiTree::from_raw_parts`]; such trees are not checked
//! for cycles here, the renderer rejects them during its walk.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Kind of an API object.
///
/// Unrecognized kinds deserialize to [`ObjectKind::Unknown`] so that newer
/// pipelines never break rendering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Module,
    Class,
    Function,
    Method,
    #[serde(alias = "attribute", alias = "data")]
    Variable,
    Argument,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ObjectKind {
    /// Lowercase name used in frontmatter and configuration keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Argument => "argument",
            Self::Unknown => "unknown",
        }
    }

    /// Whether objects of this kind render a call signature.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of an object inside an [`ApiTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Create an id from an arena index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A documented API object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiObject {
    /// Local identifier.
    pub name: String,
    /// Dot-separated path from the tree root.
    pub qualified_name: String,
    pub kind: ObjectKind,
    pub docstring: Option<String>,
    /// Type annotation (return type for callables).
    pub type_annotation: Option<String>,
    pub default_value: Option<String>,
    /// Source file hint (modules only).
    pub source_path: Option<String>,
    /// Per-object frontmatter override, highest precedence when merging.
    pub frontmatter: Mapping,
}

impl ApiObject {
    /// First non-empty docstring line, used as the summary/description.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.docstring
            .as_deref()?
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

/// One object as delivered by the upstream pipeline.
///
/// ```json
/// { "name": "app", "docstring": "The app.", "members": [
///     { "name": "App", "kind": "class", "members": [
///         { "name": "run", "kind": "method", "type": "None" } ] } ] }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    /// Defaults to `module` for top-level entries, `unknown` for members.
    #[serde(default)]
    pub kind: Option<ObjectKind>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<String>,
    #[serde(default, rename = "default")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub frontmatter: Mapping,
    #[serde(default)]
    pub members: Vec<ObjectSpec>,
}

/// Error returned when building a tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Two objects share a qualified name.
    #[error("duplicate qualified name: {0}")]
    DuplicateName(String),
    /// An object has an empty name.
    #[error("object with empty name under {parent}")]
    EmptyName {
        /// Qualified name of the parent (`<root>` for top-level entries).
        parent: String,
    },
    /// A top-level entry is not a module.
    #[error("top-level object {name} must be a module, found {kind}")]
    RootNotModule {
        /// Object name.
        name: String,
        /// Declared kind.
        kind: ObjectKind,
    },
    /// A raw-parts index points outside the arena.
    #[error("object index {0} out of range")]
    InvalidIndex(usize),
    /// JSON input could not be parsed.
    #[error("invalid API tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat arena of API objects with member and parent links.
#[derive(Debug, Default)]
pub struct ApiTree {
    objects: Vec<ApiObject>,
    members: Vec<Vec<ObjectId>>,
    parents: Vec<Option<ObjectId>>,
    roots: Vec<ObjectId>,
    name_index: HashMap<String, ObjectId>,
}

impl ApiTree {
    /// Build a tree from top-level module specs.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate qualified names, empty names, or a
    /// top-level entry that is not a module.
    pub fn from_modules(modules: Vec<ObjectSpec>) -> Result<Self, TreeError> {
        let mut tree = Self::default();
        for spec in modules {
            let kind = spec.kind.unwrap_or(ObjectKind::Module);
            if kind != ObjectKind::Module {
                return Err(TreeError::RootNotModule {
                    name: spec.name,
                    kind,
                });
            }
            let id = tree.insert(spec, None)?;
            tree.roots.push(id);
        }
        Ok(tree)
    }

    /// Parse the pipeline's JSON output (an array of modules).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Json`] for malformed JSON, or any error of
    /// [`ApiTree::from_modules`].
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let modules: Vec<ObjectSpec> = serde_json::from_str(json)?;
        Self::from_modules(modules)
    }

    /// Assemble a tree from an existing arena.
    ///
    /// Parent links are derived from the member lists (the first owner
    /// wins). Qualified names are taken as given.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidIndex`] if a member or root id is out of
    /// range.
    pub fn from_raw_parts(
        objects: Vec<ApiObject>,
        mut members: Vec<Vec<ObjectId>>,
        roots: Vec<ObjectId>,
    ) -> Result<Self, TreeError> {
        let len = objects.len();
        members.resize(len, Vec::new());

        let mut parents = vec![None; len];
        for (owner, list) in members.iter().enumerate() {
            for &member in list {
                let slot = parents
                    .get_mut(member.index())
                    .ok_or(TreeError::InvalidIndex(member.index()))?;
                if slot.is_none() {
                    *slot = Some(ObjectId(owner));
                }
            }
        }
        if let Some(bad) = roots.iter().find(|r| r.index() >= len) {
            return Err(TreeError::InvalidIndex(bad.index()));
        }

        let mut name_index = HashMap::with_capacity(len);
        for (i, object) in objects.iter().enumerate() {
            name_index
                .entry(object.qualified_name.clone())
                .or_insert(ObjectId(i));
        }

        Ok(Self {
            objects,
            members,
            parents,
            roots,
            name_index,
        })
    }

    fn insert(&mut self, spec: ObjectSpec, parent: Option<ObjectId>) -> Result<ObjectId, TreeError> {
        let parent_name = parent.map(|p| self.objects[p.0].qualified_name.clone());
        if spec.name.trim().is_empty() {
            return Err(TreeError::EmptyName {
                parent: parent_name.unwrap_or_else(|| "<root>".to_owned()),
            });
        }

        let qualified_name = match &parent_name {
            Some(p) => format!("{p}.{}", spec.name),
            None => spec.name.clone(),
        };
        if self.name_index.contains_key(&qualified_name) {
            return Err(TreeError::DuplicateName(qualified_name));
        }

        let id = ObjectId(self.objects.len());
        self.name_index.insert(qualified_name.clone(), id);
        self.objects.push(ApiObject {
            name: spec.name,
            qualified_name,
            kind: spec.kind.unwrap_or(ObjectKind::Unknown),
            docstring: spec.docstring,
            type_annotation: spec.type_annotation,
            default_value: spec.default_value,
            source_path: spec.source_path,
            frontmatter: spec.frontmatter,
        });
        self.members.push(Vec::new());
        self.parents.push(parent);

        let mut member_ids = Vec::with_capacity(spec.members.len());
        for member in spec.members {
            member_ids.push(self.insert(member, Some(id))?);
        }
        self.members[id.0] = member_ids;

        Ok(id)
    }

    /// Number of objects in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the tree has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-level modules in input order.
    #[must_use]
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Get an object by id.
    ///
    /// Ids are only valid for the tree that produced them.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> &ApiObject {
        &self.objects[id.0]
    }

    /// Direct members in declaration order.
    #[must_use]
    pub fn members(&self, id: ObjectId) -> &[ObjectId] {
        &self.members[id.0]
    }

    /// Owning object, `None` for roots.
    #[must_use]
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.parents[id.0]
    }

    /// Look up an object by exact qualified name.
    #[must_use]
    pub fn lookup(&self, qualified_name: &str) -> Option<ObjectId> {
        self.name_index.get(qualified_name).copied()
    }

    /// Iterate over all objects in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ApiObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId(i), object))
    }

    /// The object itself followed by its owners up to the root.
    ///
    /// The walk is bounded by the tree size, so malformed raw-parts trees
    /// with parent cycles still terminate.
    #[must_use]
    pub fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parents[current.0] {
            if chain.len() > self.objects.len() {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Members of kind [`ObjectKind::Argument`].
    pub fn arguments(&self, id: ObjectId) -> impl Iterator<Item = &ApiObject> {
        self.members(id)
            .iter()
            .map(|&m| self.get(m))
            .filter(|m| m.kind == ObjectKind::Argument)
    }

    /// Whether the object gets its own directory in the output tree.
    ///
    /// Modules and classes always do; any other object does when it owns
    /// members that are not arguments.
    #[must_use]
    pub fn is_container(&self, id: ObjectId) -> bool {
        match self.get(id).kind {
            ObjectKind::Module | ObjectKind::Class => true,
            _ => self
                .members(id)
                .iter()
                .any(|&m| self.get(m).kind != ObjectKind::Argument),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"[
            {
                "name": "app",
                "docstring": "Application entry points.\n\nMore text.",
                "source_path": "app/__init__.py",
                "members": [
                    {
                        "name": "App",
                        "kind": "class",
                        "docstring": "The application.",
                        "members": [
                            {
                                "name": "run",
                                "kind": "method",
                                "type": "None",
                                "members": [
                                    { "name": "self", "kind": "argument" },
                                    { "name": "port", "kind": "argument", "type": "int", "default": "8080" }
                                ]
                            }
                        ]
                    },
                    { "name": "VERSION", "kind": "data", "type": "str", "default": "'1.0'" },
                    { "name": "thing", "kind": "property" }
                ]
            }
        ]"#
    }

    #[test]
    fn test_from_json_builds_qualified_names() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        assert_eq!(tree.len(), 7);
        assert!(tree.lookup("app").is_some());
        assert!(tree.lookup("app.App").is_some());
        assert!(tree.lookup("app.App.run").is_some());
        assert!(tree.lookup("app.App.run.port").is_some());
        assert!(tree.lookup("app.VERSION").is_some());
        assert!(tree.lookup("App").is_none());
    }

    #[test]
    fn test_kinds_and_fallback() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        let kind = |qn: &str| tree.get(tree.lookup(qn).unwrap()).kind;
        assert_eq!(kind("app"), ObjectKind::Module);
        assert_eq!(kind("app.App"), ObjectKind::Class);
        assert_eq!(kind("app.App.run"), ObjectKind::Method);
        assert_eq!(kind("app.VERSION"), ObjectKind::Variable);
        assert_eq!(kind("app.thing"), ObjectKind::Unknown);
    }

    #[test]
    fn test_parent_and_ancestors() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        let run = tree.lookup("app.App.run").unwrap();
        let class = tree.lookup("app.App").unwrap();
        let module = tree.lookup("app").unwrap();
        assert_eq!(tree.parent(run), Some(class));
        assert_eq!(tree.parent(module), None);
        assert_eq!(tree.ancestors(run), vec![run, class, module]);
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        let module = tree.lookup("app").unwrap();
        let names: Vec<&str> = tree
            .members(module)
            .iter()
            .map(|&m| tree.get(m).name.as_str())
            .collect();
        assert_eq!(names, vec!["App", "VERSION", "thing"]);
    }

    #[test]
    fn test_is_container() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        assert!(tree.is_container(tree.lookup("app").unwrap()));
        assert!(tree.is_container(tree.lookup("app.App").unwrap()));
        // Only argument members: stays a leaf
        assert!(!tree.is_container(tree.lookup("app.App.run").unwrap()));
        assert!(!tree.is_container(tree.lookup("app.VERSION").unwrap()));
    }

    #[test]
    fn test_arguments_iterator() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        let run = tree.lookup("app.App.run").unwrap();
        let args: Vec<&str> = tree.arguments(run).map(|a| a.name.as_str()).collect();
        assert_eq!(args, vec!["self", "port"]);
    }

    #[test]
    fn test_summary_is_first_non_empty_line() {
        let tree = ApiTree::from_json(sample_json()).unwrap();
        let module = tree.get(tree.lookup("app").unwrap());
        assert_eq!(module.summary(), Some("Application entry points."));
        let version = tree.get(tree.lookup("app.VERSION").unwrap());
        assert_eq!(version.summary(), None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let json = r#"[{"name": "m", "members": [
            {"name": "f", "kind": "function"},
            {"name": "f", "kind": "function"}
        ]}]"#;
        let err = ApiTree::from_json(json).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName(ref n) if n == "m.f"));
    }

    #[test]
    fn test_root_must_be_module() {
        let json = r#"[{"name": "f", "kind": "function"}]"#;
        let err = ApiTree::from_json(json).unwrap_err();
        assert!(matches!(err, TreeError::RootNotModule { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let json = r#"[{"name": "m", "members": [{"name": " ", "kind": "function"}]}]"#;
        let err = ApiTree::from_json(json).unwrap_err();
        assert_eq!(err.to_string(), "object with empty name under m");
    }

    #[test]
    fn test_from_raw_parts_derives_parents() {
        let objects = vec![
            ApiObject {
                name: "m".to_owned(),
                qualified_name: "m".to_owned(),
                kind: ObjectKind::Module,
                ..Default::default()
            },
            ApiObject {
                name: "f".to_owned(),
                qualified_name: "m.f".to_owned(),
                kind: ObjectKind::Function,
                ..Default::default()
            },
        ];
        let tree = ApiTree::from_raw_parts(
            objects,
            vec![vec![ObjectId::new(1)]],
            vec![ObjectId::new(0)],
        )
        .unwrap();
        assert_eq!(tree.parent(ObjectId::new(1)), Some(ObjectId::new(0)));
        assert!(tree.members(ObjectId::new(1)).is_empty());
        assert_eq!(tree.lookup("m.f"), Some(ObjectId::new(1)));
    }

    #[test]
    fn test_from_raw_parts_invalid_index() {
        let err = ApiTree::from_raw_parts(Vec::new(), Vec::new(), vec![ObjectId::new(3)])
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidIndex(3)));
    }

    #[test]
    fn test_ancestors_terminate_on_parent_cycle() {
        let objects = vec![
            ApiObject {
                name: "a".to_owned(),
                qualified_name: "a".to_owned(),
                ..Default::default()
            },
            ApiObject {
                name: "b".to_owned(),
                qualified_name: "a.b".to_owned(),
                ..Default::default()
            },
        ];
        let tree = ApiTree::from_raw_parts(
            objects,
            vec![vec![ObjectId::new(1)], vec![ObjectId::new(0)]],
            vec![ObjectId::new(0)],
        )
        .unwrap();
        assert!(tree.ancestors(ObjectId::new(1)).len() <= tree.len() + 1);
    }
}
