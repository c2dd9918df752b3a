//! CLI error types.

use nuxtdoc_config::ConfigError;
use nuxtdoc_model::TreeError;
use nuxtdoc_site::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API tree: {0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Validation(String),
}
