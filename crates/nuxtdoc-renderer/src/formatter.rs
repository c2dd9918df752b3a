//! Per-object block formatting.

use nuxtdoc_config::{ComponentMap, ComponentRole, Config, ConfigError, FeatureItem, HeroBlock, IconTable, MarkdownOptions};
use nuxtdoc_model::{ApiObject, ApiTree, ObjectId, ObjectKind, qualified_to_path};
use serde::Serialize;

use crate::LinkResolver;
use crate::docstring;
use crate::frontmatter::{Navigation, ReferenceHeader};
use crate::mdc;
use crate::util::escape_table_cell;

/// One `{name, type, content}` record of an arguments or variables block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldItem {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub content: String,
}

#[derive(Serialize)]
struct FieldProps<'a> {
    items: &'a [FieldItem],
}

/// Markup for one object plus the references it could not resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormattedBlock {
    pub markup: String,
    pub unresolved: Vec<String>,
}

/// Formats API objects into markdown or MDC blocks.
///
/// Holds the resolved component map and icon table; both are read-only for
/// the lifetime of the formatter.
#[derive(Clone, Debug)]
pub struct Formatter {
    pub(crate) components: ComponentMap,
    pub(crate) icons: IconTable,
    pub(crate) options: MarkdownOptions,
    pub(crate) use_mdc: bool,
    code_language: String,
}

impl Formatter {
    /// Build a formatter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid component or icon overrides.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            components: config.components()?,
            icons: config.icons()?,
            options: config.markdown.clone(),
            use_mdc: config.use_mdc,
            code_language: config.code_language.clone(),
        })
    }

    /// Whether component mode is enabled.
    #[must_use]
    pub fn use_mdc(&self) -> bool {
        self.use_mdc
    }

    #[must_use]
    pub fn icons(&self) -> &IconTable {
        &self.icons
    }

    #[must_use]
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Anchor id of an object block.
    #[must_use]
    pub fn anchor(object: &ApiObject) -> String {
        qualified_to_path(&object.qualified_name).join(".")
    }

    /// Title used for headings and frontmatter.
    #[must_use]
    pub fn title<'a>(&self, object: &'a ApiObject) -> &'a str {
        if self.options.module_prefix_titles {
            &object.qualified_name
        } else {
            &object.name
        }
    }

    /// Render one object.
    ///
    /// `level` is the heading depth; 0 suppresses the heading because the
    /// page title comes from frontmatter.
    ///
    /// # Errors
    ///
    /// Returns an error if component props cannot be serialized.
    pub fn format_object(
        &self,
        tree: &ApiTree,
        id: ObjectId,
        level: usize,
        links: &dyn LinkResolver,
    ) -> Result<FormattedBlock, serde_yaml::Error> {
        let object = tree.get(id);
        let mut parts: Vec<String> = Vec::new();
        let mut unresolved = Vec::new();

        if self.options.header_anchors {
            parts.push(format!("<a id=\"{}\"></a>", Self::anchor(object)));
        }
        if level > 0 {
            parts.push(format!("{} {}", "#".repeat(level.min(6)), self.title(object)));
        }
        parts.push(self.header(tree, id)?);
        if let Some(code) = self.code_block(tree, id) {
            parts.push(code);
        }

        let mut has_arguments = false;
        if let Some(text) = object.docstring.as_deref().filter(|d| !d.trim().is_empty()) {
            let processed = docstring::process(self, text, id, links, &mut unresolved)?;
            has_arguments = processed.has_arguments;
            if !processed.markup.is_empty() {
                parts.push(processed.markup);
            }
        }
        if object.kind.is_callable() && !has_arguments {
            let items = self.member_arguments(tree, id, links, &mut unresolved);
            if !items.is_empty() {
                let block = self.format_arguments(&items)?;
                parts.push(if self.use_mdc {
                    block
                } else {
                    format!("**Arguments**:\n\n{block}")
                });
            }
        }

        Ok(FormattedBlock {
            markup: parts.join("\n\n"),
            unresolved,
        })
    }

    /// Render a variables block.
    ///
    /// # Errors
    ///
    /// Returns an error if component props cannot be serialized.
    pub fn format_variables(&self, items: &[FieldItem]) -> Result<String, serde_yaml::Error> {
        self.format_fields(ComponentRole::Variables, items)
    }

    /// Render an arguments block.
    ///
    /// # Errors
    ///
    /// Returns an error if component props cannot be serialized.
    pub fn format_arguments(&self, items: &[FieldItem]) -> Result<String, serde_yaml::Error> {
        self.format_fields(ComponentRole::Arguments, items)
    }

    fn format_fields(
        &self,
        role: ComponentRole,
        items: &[FieldItem],
    ) -> Result<String, serde_yaml::Error> {
        if self.use_mdc {
            return mdc::block_with_yaml(self.components.tag(role), &FieldProps { items }, "");
        }

        let mut rows = vec![
            "| Name | Type | Description |".to_owned(),
            "| --- | --- | --- |".to_owned(),
        ];
        for item in items {
            let type_cell = if item.type_name.is_empty() {
                String::new()
            } else {
                format!("`{}`", escape_table_cell(&item.type_name))
            };
            rows.push(format!(
                "| `{}` | {} | {} |",
                escape_table_cell(&item.name),
                type_cell,
                escape_table_cell(&item.content)
            ));
        }
        Ok(rows.join("\n"))
    }

    /// Structured metadata shown under the heading.
    fn header(&self, tree: &ApiTree, id: ObjectId) -> Result<String, serde_yaml::Error> {
        let object = tree.get(id);
        let kind = object.kind.as_str();

        if !self.use_mdc {
            return Ok(match &object.type_annotation {
                Some(ty) => format!("_{kind}_ `{ty}`"),
                None => format!("_{kind}_"),
            });
        }

        let props = ReferenceHeader {
            title: self.title(object),
            description: object.summary(),
            kind,
            type_annotation: object.type_annotation.as_deref(),
            navigation: Navigation {
                title: object.name.clone(),
                icon: self.icons.icon(object.kind).to_owned(),
                level: tree.ancestors(id).len() - 1,
                order: None,
            },
        };
        mdc::block_with_yaml(
            self.components.tag(ComponentRole::ReferenceHeader),
            &props,
            "",
        )
    }

    /// Signature for callables, `name: type = value` for data.
    fn code_block(&self, tree: &ApiTree, id: ObjectId) -> Option<String> {
        let object = tree.get(id);
        let code = match object.kind {
            ObjectKind::Function | ObjectKind::Method if self.options.signature_block => {
                let args: Vec<String> = tree.arguments(id).map(data_signature).collect();
                let keyword = if self.code_language == "python" { "def " } else { "" };
                let returns = object
                    .type_annotation
                    .as_deref()
                    .map(|ty| format!(" -> {ty}"))
                    .unwrap_or_default();
                format!("{keyword}{}({}){returns}", object.name, args.join(", "))
            }
            ObjectKind::Variable if self.options.data_block => {
                if object.type_annotation.is_none() && object.default_value.is_none() {
                    return None;
                }
                data_signature(object)
            }
            _ => return None,
        };
        Some(format!("```{}\n{code}\n```", self.code_language))
    }

    /// Argument records built from documented argument members.
    fn member_arguments(
        &self,
        tree: &ApiTree,
        id: ObjectId,
        links: &dyn LinkResolver,
        unresolved: &mut Vec<String>,
    ) -> Vec<FieldItem> {
        let documented = tree
            .arguments(id)
            .any(|a| a.docstring.as_deref().is_some_and(|d| !d.trim().is_empty()));
        if !documented {
            return Vec::new();
        }
        tree.arguments(id)
            .filter(|a| a.docstring.is_some() || a.type_annotation.is_some())
            .map(|a| FieldItem {
                name: a.name.clone(),
                type_name: a.type_annotation.clone().unwrap_or_default(),
                content: a
                    .docstring
                    .as_deref()
                    .map(|d| docstring::prose(self, d, id, links, unresolved))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Hero section for a page.
    #[must_use]
    pub fn format_hero(&self, hero: &HeroBlock) -> String {
        let mut content = format!("# {}", hero.title);
        if !hero.description.is_empty() {
            content.push_str(&format!("\n\n{}", hero.description));
        }

        if !self.use_mdc {
            for link in &hero.links {
                content.push_str(&format!("\n\n[{}]({})", link.label, link.to));
            }
            return content;
        }

        if !hero.links.is_empty() {
            let buttons: Vec<String> = hero
                .links
                .iter()
                .map(|link| {
                    mdc::button(
                        self.components.tag(ComponentRole::Button),
                        &link.label,
                        &link.to,
                        &link.variant,
                    )
                })
                .collect();
            content.push_str(&format!("\n\n{}", buttons.join("\n")));
        }
        mdc::hero(self.components.tag(ComponentRole::Hero), &content)
    }

    /// Feature cards for a page.
    #[must_use]
    pub fn format_features(&self, features: &[FeatureItem]) -> String {
        let cards: Vec<String> = features
            .iter()
            .map(|feature| {
                if self.use_mdc {
                    mdc::feature(
                        self.components.tag(ComponentRole::Feature),
                        &feature.title,
                        feature.icon.as_deref(),
                        &feature.description,
                    )
                } else {
                    format!("### {}\n\n{}", feature.title, feature.description)
                }
            })
            .collect();
        cards.join("\n\n")
    }
}

/// `name: type = value`, omitting missing parts.
fn data_signature(object: &ApiObject) -> String {
    let mut out = object.name.clone();
    if let Some(ty) = &object.type_annotation {
        out.push_str(&format!(": {ty}"));
    }
    if let Some(value) = &object.default_value {
        out.push_str(&format!(" = {value}"));
    }
    out
}
