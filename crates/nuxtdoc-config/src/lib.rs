//! Configuration management for nuxtdoc.
//!
//! Parses `nuxtdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content_directory`
//! - `output_dir`
//! - `base_url`
//! - `input`

mod components;
mod expand;
mod icons;
mod pages;

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Mapping;

pub use components::{ComponentMap, ComponentRole};
pub use icons::{FALLBACK_ICON_KEY, IconTable};
pub use pages::{ContentPattern, DEFAULT_EXTENSION, FeatureItem, HeroBlock, HeroLink, PageEntry};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content directory.
    pub content_dir: Option<PathBuf>,
    /// Override API tree input file.
    pub input: Option<PathBuf>,
    /// Override component mode.
    pub use_mdc: Option<bool>,
    /// Override clean pre-pass.
    pub clean_render: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "nuxtdoc.toml";

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content root as written in TOML (relative to the config file).
    content_directory: String,
    /// API tree JSON as written in TOML.
    input: Option<String>,
    /// Subdirectory of the content root for generated API pages.
    pub output_dir: String,
    /// Emit MDC components instead of plain markdown.
    pub use_mdc: bool,
    /// Remove previous content before writing.
    pub clean_render: bool,
    /// Prefix for absolute links. Derived from `content_directory` when
    /// unset, see [`Config::link_base`].
    pub base_url: Option<String>,
    /// Emit `base_url`-rooted links instead of relative ones.
    pub absolute_links: bool,
    /// Language tag for signature and value code blocks.
    pub code_language: String,
    /// Frontmatter merged into every emitted file at lowest precedence.
    pub default_frontmatter: Mapping,
    /// Component identifier overrides keyed by role.
    pub mdc_components: BTreeMap<String, String>,
    /// Icon overrides keyed by object kind.
    pub object_icons: BTreeMap<String, String>,
    /// Markdown rendering options.
    pub markdown: MarkdownOptions,
    /// Page structure.
    pub pages: Vec<PageEntry>,

    /// Resolved paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Resolved filesystem locations.
#[derive(Clone, Debug, Default)]
pub struct PathsConfig {
    /// Directory holding `nuxtdoc.toml` (or the working directory).
    pub project_dir: PathBuf,
    /// Content root all files are written below.
    pub content_dir: PathBuf,
    /// API tree JSON, when configured.
    pub input: Option<PathBuf>,
}

/// Markdown rendering options.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkdownOptions {
    /// Insert an HTML anchor before each object block.
    pub header_anchors: bool,
    /// Escape `&`, `<` and `>` in docstrings outside code and blockquotes.
    pub escape_html: bool,
    /// Use qualified names as block titles.
    pub module_prefix_titles: bool,
    /// Prepend a table of contents to generated bodies.
    pub render_toc: bool,
    /// Deepest heading level listed in the table of contents.
    pub toc_max_depth: u8,
    /// Show call signatures for functions and methods.
    pub signature_block: bool,
    /// Show `name: type = value` blocks for variables.
    pub data_block: bool,
    /// Render docstrings as blockquotes.
    pub docstrings_as_blockquote: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            header_anchors: true,
            escape_html: true,
            module_prefix_titles: false,
            render_toc: false,
            toc_max_depth: 2,
            signature_block: true,
            data_block: true,
            docstrings_as_blockquote: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_BASE`} not set").
        message: String,
    },
    /// Malformed `mdc_components` entry.
    #[error("Invalid component mapping for {role}: {message}")]
    Component {
        /// Role key as written in the config.
        role: String,
        /// What is wrong with it.
        message: String,
    },
    /// Malformed page entry.
    #[error("Invalid page {page:?}: {message}")]
    Page {
        /// Page name.
        page: String,
        /// What is wrong with it.
        message: String,
    },
    /// Two outputs resolve to the same file.
    #[error("{first} and {second} both write {path}")]
    Conflict {
        /// First claimant (page name or qualified name).
        first: String,
        /// Second claimant.
        second: String,
        /// Conflicting path relative to the content root.
        path: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `nuxtdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated once more after the overrides.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.paths.content_dir = self.paths.project_dir.join(content_dir);
            self.content_directory = content_dir.to_string_lossy().into_owned();
        }
        if let Some(input) = &settings.input {
            self.paths.input = Some(input.clone());
        }
        if let Some(use_mdc) = settings.use_mdc {
            self.use_mdc = use_mdc;
        }
        if let Some(clean_render) = settings.clean_render {
            self.clean_render = clean_render;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            content_directory: "content".to_owned(),
            input: None,
            output_dir: String::new(),
            use_mdc: true,
            clean_render: true,
            base_url: None,
            absolute_links: false,
            code_language: "python".to_owned(),
            default_frontmatter: Mapping::new(),
            mdc_components: BTreeMap::new(),
            object_icons: BTreeMap::new(),
            markdown: MarkdownOptions::default(),
            pages: Vec::new(),
            paths: PathsConfig {
                project_dir: base.to_path_buf(),
                content_dir: base.join("content"),
                input: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.content_directory = expand::expand_env(&self.content_directory, "content_directory")?;
        self.output_dir = expand::expand_env(&self.output_dir, "output_dir")?;
        if let Some(ref base_url) = self.base_url {
            self.base_url = Some(expand::expand_env(base_url, "base_url")?);
        }
        if let Some(ref input) = self.input {
            self.input = Some(expand::expand_env(input, "input")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.paths = PathsConfig {
            project_dir: config_dir.to_path_buf(),
            content_dir: config_dir.join(&self.content_directory),
            input: self.input.as_deref().map(|input| config_dir.join(input)),
        };
    }

    /// Prefix of absolute links, ending in `/`.
    ///
    /// An explicit `base_url` wins. Otherwise the prefix is the content
    /// directory with a leading `content` segment removed, since Nuxt
    /// Content serves `content/docs/api/x.md` at `/docs/api/x`.
    #[must_use]
    pub fn link_base(&self) -> String {
        if let Some(base_url) = &self.base_url {
            return base_url.clone();
        }
        let mut segments: Vec<&str> = self
            .content_directory
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if segments.first().is_some_and(|s| s.eq_ignore_ascii_case("content")) {
            segments.remove(0);
        }
        if segments.is_empty() {
            "/".to_owned()
        } else {
            format!("/{}/", segments.join("/"))
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`]. Conflicts between page files
    /// and generated API files need the API tree and are checked by the
    /// renderer before it writes anything.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_paths()?;
        self.validate_markdown()?;
        self.components()?;
        self.icons()?;
        for page in &self.pages {
            page.validate()?;
        }
        Ok(())
    }

    fn validate_paths(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.content_directory, "content_directory")?;
        if let Some(base_url) = &self.base_url {
            require_non_empty(base_url, "base_url")?;
        }
        require_non_empty(&self.code_language, "code_language")?;
        if !self.output_dir.is_empty() {
            pages::require_relative_dir(&self.output_dir)
                .map_err(|message| ConfigError::Validation(format!("output_dir: {message}")))?;
        }

        if self.clean_render {
            let content = normalize(&self.paths.content_dir);
            if content.parent().is_none() {
                return Err(ConfigError::Validation(format!(
                    "clean_render refuses to clean {}",
                    self.paths.content_dir.display()
                )));
            }
            if content == normalize(&self.paths.project_dir) {
                return Err(ConfigError::Validation(
                    "clean_render refuses to clean the project directory".to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn validate_markdown(&self) -> Result<(), ConfigError> {
        let depth = self.markdown.toc_max_depth;
        if !(1..=6).contains(&depth) {
            return Err(ConfigError::Validation(format!(
                "markdown.toc_max_depth must be between 1 and 6, got {depth}"
            )));
        }
        Ok(())
    }

    /// Component map with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Component`] for invalid `mdc_components`.
    pub fn components(&self) -> Result<ComponentMap, ConfigError> {
        ComponentMap::from_overrides(&self.mdc_components)
    }

    /// Icon table with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for unknown `object_icons` keys.
    pub fn icons(&self) -> Result<IconTable, ConfigError> {
        IconTable::from_overrides(&self.object_icons)
    }

    /// Directory segments of `output_dir`.
    #[must_use]
    pub fn output_segments(&self) -> Vec<String> {
        self.output_dir
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_owned)
            .collect()
    }
}

/// Lexically normalize a path: drop `.` components and fold `..`.
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
