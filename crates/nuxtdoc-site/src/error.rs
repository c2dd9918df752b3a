//! Render pass errors.

use std::path::PathBuf;

use nuxtdoc_config::ConfigError;

use crate::writer::RenderReport;

/// Error aborting a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Invalid configuration, reported before anything is written.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The same qualified name was reached twice while walking the tree.
    #[error("Cycle detected in API tree at {qualified_name}")]
    CycleDetected {
        /// Qualified name visited twice.
        qualified_name: String,
    },
    /// The clean pre-pass failed; nothing was written.
    #[error("Failed to clean {}: {source}", path.display())]
    Clean {
        /// Entry that could not be removed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Some files could not be written.
    #[error(
        "{} of {} files could not be written",
        .0.failed.len(),
        .0.failed.len() + .0.written.len()
    )]
    Incomplete(RenderReport),
    /// A static page source could not be read.
    #[error("Failed to read source {} of page {page}: {source}", path.display())]
    Source {
        /// Page name.
        page: String,
        /// Resolved source path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Component props or frontmatter could not be serialized.
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
