//! Navigation icons per object kind.

use std::collections::BTreeMap;

use nuxtdoc_model::ObjectKind;

use crate::ConfigError;

const BOOK_ICON: &str = "i-material-symbols-light-book-4-spark-outline-rounded";
const CLASS_ICON: &str = "i-material-symbols-light-class-outline-rounded";
const FUNCTION_ICON: &str = "i-material-symbols-light-function-outline-rounded";
const VARIABLE_ICON: &str = "i-material-symbols-light-variable-outline-rounded";

/// Key of the fallback entry, also used for static pages.
pub const FALLBACK_ICON_KEY: &str = "page";

const ICON_KEYS: [&str; 7] = [
    "module",
    "class",
    "function",
    "method",
    "variable",
    "argument",
    FALLBACK_ICON_KEY,
];

/// Iconify icon names keyed by object kind, with a fallback entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconTable {
    icons: BTreeMap<String, String>,
}

impl IconTable {
    /// Layer user overrides over the default table.
    ///
    /// `attribute` is accepted as an alias of `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for keys that name no kind.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for (key, icon) in overrides {
            let key = if key == "attribute" { "variable" } else { key.as_str() };
            if !ICON_KEYS.contains(&key) {
                return Err(ConfigError::Validation(format!(
                    "object_icons.{key} is not a known object kind"
                )));
            }
            table.icons.insert(key.to_owned(), icon.clone());
        }
        Ok(table)
    }

    /// Icon for an object kind; unknown kinds use the fallback entry.
    #[must_use]
    pub fn icon(&self, kind: ObjectKind) -> &str {
        self.icons
            .get(kind.as_str())
            .or_else(|| self.icons.get(FALLBACK_ICON_KEY))
            .map_or(BOOK_ICON, String::as_str)
    }

    /// Icon for static pages.
    #[must_use]
    pub fn page_icon(&self) -> &str {
        self.icons
            .get(FALLBACK_ICON_KEY)
            .map_or(BOOK_ICON, String::as_str)
    }
}

impl Default for IconTable {
    fn default() -> Self {
        let icons = [
            ("module", BOOK_ICON),
            ("class", CLASS_ICON),
            ("function", FUNCTION_ICON),
            ("method", FUNCTION_ICON),
            ("variable", VARIABLE_ICON),
            ("argument", VARIABLE_ICON),
            (FALLBACK_ICON_KEY, BOOK_ICON),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        Self { icons }
    }
}
