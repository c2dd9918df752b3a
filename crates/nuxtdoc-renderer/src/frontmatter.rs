//! Frontmatter records and layered merging.
//!
//! Every emitted file starts with a YAML block built from layers of
//! increasing precedence: built-in values, configuration defaults, the page
//! entry's frontmatter and finally the object's own override.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Navigation block shared by frontmatter and reference headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub title: String,
    pub icon: String,
    /// Nesting depth (module = 0).
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Default search-engine metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Seo {
    pub title: String,
    pub description: String,
}

/// Built-in frontmatter of an emitted file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub navigation: Navigation,
    pub seo: Seo,
}

impl PageMeta {
    /// Built-in values, with `seo` mirroring title and description.
    #[must_use]
    pub fn new(title: String, description: Option<String>, navigation: Navigation) -> Self {
        let seo = Seo {
            title: title.clone(),
            description: description.clone().unwrap_or_default(),
        };
        Self {
            title,
            description,
            navigation,
            seo,
        }
    }

    /// Convert to a YAML mapping for merging.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_mapping(&self) -> Result<Mapping, serde_yaml::Error> {
        match serde_yaml::to_value(self)? {
            Value::Mapping(mapping) => Ok(mapping),
            _ => Ok(Mapping::new()),
        }
    }
}

/// Props of the reference header component placed at the top of each
/// object block.
#[derive(Clone, Debug, Serialize)]
pub struct ReferenceHeader<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub kind: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<&'a str>,
    pub navigation: Navigation,
}

/// Merge `overlay` into `base`.
///
/// Later values win. Nested mappings are merged key by key; a non-mapping
/// value replaces whatever was there.
pub fn merge_frontmatter(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        if let (Some(Value::Mapping(existing)), Value::Mapping(incoming)) =
            (base.get_mut(key), value)
        {
            merge_frontmatter(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Fold layers from lowest to highest precedence.
pub fn layer_frontmatter(layers: &[&Mapping]) -> Mapping {
    let mut result = Mapping::new();
    for layer in layers {
        merge_frontmatter(&mut result, layer);
    }
    result
}

/// Serialize frontmatter and body into a complete document.
///
/// # Errors
///
/// Returns an error if the frontmatter cannot be serialized.
pub fn render_document(frontmatter: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    let body = body.trim_matches('\n');
    if body.is_empty() {
        Ok(format!("---\n{yaml}---\n"))
    } else {
        Ok(format!("---\n{yaml}---\n\n{body}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_later_layer_wins() {
        let merged = layer_frontmatter(&[&yaml("layout: default\ntoc: true"), &yaml("layout: api")]);
        assert_eq!(merged, yaml("layout: api\ntoc: true"));
    }

    #[test]
    fn test_nested_mappings_merge_key_wise() {
        let merged = layer_frontmatter(&[
            &yaml("navigation:\n  title: run\n  icon: i-fn\n  level: 2"),
            &yaml("navigation:\n  icon: i-custom\n  badge: new"),
        ]);
        assert_eq!(
            merged,
            yaml("navigation:\n  title: run\n  icon: i-custom\n  level: 2\n  badge: new")
        );
    }

    #[test]
    fn test_non_mapping_replaces_mapping() {
        let merged = layer_frontmatter(&[&yaml("navigation:\n  title: run"), &yaml("navigation: false")]);
        assert_eq!(merged, yaml("navigation: false"));
    }

    #[test]
    fn test_mapping_replaces_scalar() {
        let merged = layer_frontmatter(&[&yaml("navigation: true"), &yaml("navigation:\n  title: x")]);
        assert_eq!(merged, yaml("navigation:\n  title: x"));
    }

    #[test]
    fn test_page_meta_mapping() {
        let meta = PageMeta::new(
            "App".to_owned(),
            None,
            Navigation {
                title: "App".to_owned(),
                icon: "i-class".to_owned(),
                level: 1,
                order: Some(1),
            },
        );
        assert_eq!(
            meta.to_mapping().unwrap(),
            yaml(
                "title: App\nnavigation:\n  title: App\n  icon: i-class\n  level: 1\n  order: 1\nseo:\n  title: App\n  description: ''"
            )
        );
    }

    #[test]
    fn test_seo_default_yields_to_later_layers() {
        let meta = PageMeta::new(
            "run".to_owned(),
            Some("Start the server.".to_owned()),
            Navigation {
                title: "run".to_owned(),
                icon: "i-fn".to_owned(),
                level: 2,
                order: None,
            },
        );
        let base = meta.to_mapping().unwrap();
        let merged = layer_frontmatter(&[&base, &yaml("seo:\n  title: Custom")]);
        assert_eq!(
            merged.get("seo"),
            Some(&serde_yaml::Value::Mapping(yaml(
                "title: Custom\ndescription: Start the server."
            )))
        );
    }

    #[test]
    fn test_render_document() {
        let doc = render_document(&yaml("title: App"), "Body text.\n\n").unwrap();
        assert_eq!(doc, "---\ntitle: App\n---\n\nBody text.\n");
    }
}
