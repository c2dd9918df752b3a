//! Declarative page structure.

use std::path::{Component, Path};

use glob::Pattern;
use serde::Deserialize;
use serde_yaml::Mapping;

use crate::ConfigError;

/// Default page file extension.
pub const DEFAULT_EXTENSION: &str = ".md";

/// One `[[pages]]` entry.
///
/// Entries with `contents` collect API objects; entries without are static
/// pages, optionally embedding a `source` file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageEntry {
    /// Display title. Falls back to `name` when empty.
    pub title: String,
    /// File name (slug) without extension.
    pub name: String,
    /// Directory relative to the content root.
    pub directory: Option<String>,
    /// Static markdown file to embed, relative to the project directory.
    pub source: Option<String>,
    /// Content selection patterns.
    pub contents: Option<Vec<String>>,
    /// Frontmatter merged over the configuration defaults.
    pub frontmatter: Mapping,
    /// File extension including the dot.
    pub extension: Option<String>,
    /// Explicit navigation order.
    pub order: Option<i64>,
    pub hero: Option<HeroBlock>,
    pub features: Vec<FeatureItem>,
    /// Nested pages rendered below this entry's directory.
    pub children: Vec<PageEntry>,
}

/// Hero section shown at the top of a page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroBlock {
    pub title: String,
    pub description: String,
    pub links: Vec<HeroLink>,
}

/// Call-to-action button inside a hero section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeroLink {
    pub label: String,
    pub to: String,
    #[serde(default = "default_variant")]
    pub variant: String,
}

fn default_variant() -> String {
    "primary".to_owned()
}

/// Feature card.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureItem {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
}

impl PageEntry {
    /// Title shown in frontmatter and navigation.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// File extension, `.md` unless overridden.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// Parsed content patterns, empty for static pages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Page`] for an unsupported pattern form.
    pub fn patterns(&self) -> Result<Vec<ContentPattern>, ConfigError> {
        self.contents
            .iter()
            .flatten()
            .map(|raw| {
                ContentPattern::parse(raw).map_err(|message| ConfigError::Page {
                    page: self.name.clone(),
                    message,
                })
            })
            .collect()
    }

    /// Check the entry and its children.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| ConfigError::Page {
            page: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(ConfigError::Page {
                page: self.title.clone(),
                message: "page name cannot be empty".to_owned(),
            });
        }
        if self.name.contains(['/', '\\']) {
            return Err(fail("page name cannot contain path separators".to_owned()));
        }
        let mut components = Path::new(&self.name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(fail(format!(
                "page name {:?} must be a single file name",
                self.name
            )));
        }
        if self.source.is_some() && self.contents.is_some() {
            return Err(fail("source and contents are mutually exclusive".to_owned()));
        }
        if let Some(directory) = &self.directory {
            require_relative_dir(directory).map_err(fail)?;
        }
        if !self.extension().starts_with('.') {
            return Err(fail(format!(
                "extension {:?} must start with a dot",
                self.extension()
            )));
        }
        self.patterns()?;

        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}

/// Directory must stay inside the content root.
pub(crate) fn require_relative_dir(directory: &str) -> Result<(), String> {
    let path = Path::new(directory);
    if path.is_absolute() || directory.starts_with('/') {
        return Err(format!("directory {directory:?} must be relative"));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!("directory {directory:?} cannot contain '..'"));
    }
    Ok(())
}

/// Validated content selection pattern.
///
/// Only three forms are supported: a bare `*` (whole tree), `prefix.*`
/// (every descendant of `prefix`) and an exact qualified name.
#[derive(Clone, Debug)]
pub enum ContentPattern {
    All,
    Descendants(Pattern),
    Exact(String),
}

impl ContentPattern {
    /// Parse a raw pattern string.
    ///
    /// # Errors
    ///
    /// Returns a message for empty patterns and wildcards in any other
    /// position.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("content pattern cannot be empty".to_owned());
        }
        if raw == "*" {
            return Ok(Self::All);
        }
        let (prefix, descendants) = match raw.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (raw, false),
        };
        if prefix.is_empty() || prefix.contains(['*', '?', '[', ']']) {
            return Err(format!(
                "unsupported content pattern {raw:?}: use \"*\", \"pkg.*\" or an exact name"
            ));
        }
        if !descendants {
            return Ok(Self::Exact(prefix.to_owned()));
        }
        Pattern::new(&format!("{}.*", Pattern::escape(prefix)))
            .map(Self::Descendants)
            .map_err(|e| format!("invalid content pattern {raw:?}: {e}"))
    }

    /// Whether a qualified name is selected.
    #[must_use]
    pub fn matches(&self, qualified_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Descendants(pattern) => pattern.matches(qualified_name),
            Self::Exact(name) => name == qualified_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> PageEntry {
        PageEntry {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pattern_all() {
        let pattern = ContentPattern::parse("*").unwrap();
        assert!(pattern.matches("pkg"));
        assert!(pattern.matches("pkg.mod.Class"));
    }

    #[test]
    fn test_pattern_descendants() {
        let pattern = ContentPattern::parse("pkg.*").unwrap();
        assert!(pattern.matches("pkg.a"));
        assert!(pattern.matches("pkg.a.b.c"));
        assert!(!pattern.matches("pkg"));
        assert!(!pattern.matches("pkgx.a"));
        assert!(!pattern.matches("other.pkg.a"));
    }

    #[test]
    fn test_pattern_exact() {
        let pattern = ContentPattern::parse("pkg.mod").unwrap();
        assert!(pattern.matches("pkg.mod"));
        assert!(!pattern.matches("pkg.mod.x"));
        assert!(!pattern.matches("pkg"));
    }

    #[test]
    fn test_pattern_unsupported_forms() {
        for raw in ["", "pkg*", "*.mod", "pkg.*.x", "pk?", ".*", "[ab].x"] {
            assert!(ContentPattern::parse(raw).is_err(), "{raw:?} should fail");
        }
    }

    #[test]
    fn test_parse_page_entry() {
        let toml = r#"
title = "API"
name = "api"
directory = "reference"
contents = ["pkg.*"]
order = 5

[frontmatter]
category = "API"

[hero]
title = "Reference"
links = [{ label = "Start", to = "/start" }]

[[features]]
title = "Typed"
icon = "i-lucide-shield"
"#;
        let page: PageEntry = toml::from_str(toml).unwrap();
        assert_eq!(page.display_title(), "API");
        assert_eq!(page.extension(), ".md");
        assert_eq!(page.order, Some(5));
        assert_eq!(page.hero.as_ref().unwrap().links[0].variant, "primary");
        assert_eq!(page.features.len(), 1);
        assert_eq!(page.patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<PageEntry, _> = toml::from_str("name = \"x\"\ncontent = [\"*\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_source_and_contents_conflict() {
        let page = PageEntry {
            source: Some("README.md".to_owned()),
            contents: Some(vec!["*".to_owned()]),
            ..entry("index")
        };
        let err = page.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Page { ref page, .. } if page == "index"));
    }

    #[test]
    fn test_validate_directory_escape() {
        let page = PageEntry {
            directory: Some("../outside".to_owned()),
            ..entry("api")
        };
        assert!(page.validate().is_err());

        let page = PageEntry {
            directory: Some("/abs".to_owned()),
            ..entry("api")
        };
        assert!(page.validate().is_err());
    }

    #[test]
    fn test_validate_dot_names_rejected() {
        for name in ["..", "."] {
            let err = entry(name).validate().unwrap_err();
            assert!(err.to_string().contains("single file name"), "{name}: {err}");
        }

        let page = PageEntry {
            children: vec![entry("child")],
            ..entry("..")
        };
        assert!(matches!(page.validate(), Err(ConfigError::Page { ref page, .. }) if page == ".."));
        entry("v1.2").validate().unwrap();
    }

    #[test]
    fn test_validate_checks_children() {
        let page = PageEntry {
            children: vec![entry("")],
            ..entry("guide")
        };
        assert!(page.validate().is_err());
    }

    #[test]
    fn test_display_title_falls_back_to_name() {
        assert_eq!(entry("changelog").display_title(), "changelog");
    }
}
