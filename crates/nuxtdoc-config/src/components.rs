//! Component role mapping.
//!
//! Each logical role the formatter emits (alert, arguments table, hero,
//! ...) maps to a component identifier in the consuming site. Identifiers
//! are written in `PascalCase` and converted to their MDC tag form once,
//! when the map is built.

use std::collections::BTreeMap;
use std::fmt;

use nuxtdoc_model::to_component_tag;

use crate::ConfigError;

/// Logical component role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentRole {
    Alert,
    CodeGroup,
    Tabs,
    Variables,
    Arguments,
    Returns,
    Raises,
    Examples,
    Notes,
    Warnings,
    SeeAlso,
    Button,
    Card,
    Hero,
    Feature,
    ReferenceHeader,
}

impl ComponentRole {
    /// All roles in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Alert,
        Self::CodeGroup,
        Self::Tabs,
        Self::Variables,
        Self::Arguments,
        Self::Returns,
        Self::Raises,
        Self::Examples,
        Self::Notes,
        Self::Warnings,
        Self::SeeAlso,
        Self::Button,
        Self::Card,
        Self::Hero,
        Self::Feature,
        Self::ReferenceHeader,
    ];

    /// Configuration key (`mdc_components.<key>`).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::CodeGroup => "code_group",
            Self::Tabs => "tabs",
            Self::Variables => "variables",
            Self::Arguments => "arguments",
            Self::Returns => "returns",
            Self::Raises => "raises",
            Self::Examples => "examples",
            Self::Notes => "notes",
            Self::Warnings => "warnings",
            Self::SeeAlso => "see_also",
            Self::Button => "button",
            Self::Card => "card",
            Self::Hero => "hero",
            Self::Feature => "feature",
            Self::ReferenceHeader => "reference_header",
        }
    }

    /// Default Nuxt UI component for this role.
    #[must_use]
    pub fn default_component(self) -> &'static str {
        match self {
            Self::Alert | Self::Notes | Self::Warnings => "UAlert",
            Self::CodeGroup | Self::Examples => "UCodeGroup",
            Self::Tabs => "UTabs",
            Self::Variables => "UVariables",
            Self::Arguments => "UArguments",
            Self::Returns => "UReturns",
            Self::Raises => "UCallout",
            Self::SeeAlso | Self::Card => "UCard",
            Self::Button => "UButton",
            Self::Hero => "UPageHero",
            Self::Feature => "ULandingCard",
            Self::ReferenceHeader => "UPageHeader",
        }
    }

    /// Parse a configuration key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolved role → MDC tag mapping.
///
/// Read-only once built; the renderer looks tags up by role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMap {
    tags: BTreeMap<ComponentRole, String>,
}

impl ComponentMap {
    /// Build the map from user overrides layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Component`] for an unknown role or an
    /// identifier that does not start with a letter.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        for key in overrides.keys() {
            if ComponentRole::from_key(key).is_none() {
                return Err(ConfigError::Component {
                    role: key.clone(),
                    message: "unknown component role".to_owned(),
                });
            }
        }

        let mut tags = BTreeMap::new();
        for role in ComponentRole::ALL {
            let identifier = overrides
                .get(role.key())
                .map_or(role.default_component(), String::as_str);
            tags.insert(role, component_tag(role, identifier)?);
        }
        Ok(Self { tags })
    }

    /// MDC tag for a role (e.g. `u-arguments`).
    #[must_use]
    pub fn tag(&self, role: ComponentRole) -> &str {
        self.tags.get(&role).map_or("", String::as_str)
    }
}

impl Default for ComponentMap {
    fn default() -> Self {
        let tags = ComponentRole::ALL
            .into_iter()
            .map(|role| {
                let tag = to_component_tag(role.default_component()).unwrap_or_default();
                (role, tag)
            })
            .collect();
        Self { tags }
    }
}

fn component_tag(role: ComponentRole, identifier: &str) -> Result<String, ConfigError> {
    let identifier = identifier.trim();
    if !identifier.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Component {
            role: role.key().to_owned(),
            message: format!("component identifier {identifier:?} must start with a letter"),
        });
    }
    to_component_tag(identifier).map_err(|e| ConfigError::Component {
        role: role.key().to_owned(),
        message: e.to_string(),
    })
}
