//! `nuxtdoc render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use nuxtdoc_config::{CliSettings, Config};
use nuxtdoc_model::ApiTree;
use nuxtdoc_site::{RenderError, RenderReport, TreeRenderer};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover nuxtdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API tree JSON produced by the parser, `-` for stdin (overrides config).
    #[arg(short, long, env = "NUXTDOC_INPUT")]
    input: Option<PathBuf>,

    /// Content directory to write into (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Enable verbose output (per-pass logs and written files).
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit MDC components (default: enabled).
    #[arg(long)]
    mdc: Option<bool>,

    /// Emit plain markdown instead of MDC components.
    #[arg(long, conflicts_with = "mdc")]
    no_mdc: bool,

    /// Remove previous content before writing (default: enabled).
    #[arg(long)]
    clean: Option<bool>,

    /// Keep previous content and overwrite in place.
    #[arg(long, conflicts_with = "clean")]
    no_clean: bool,

    /// List the files that would be written without touching disk.
    #[arg(long)]
    dry_run: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or input loading fails, or the
    /// render pass does not complete.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir.clone(),
            input: self.input.clone(),
            use_mdc: self.resolve_use_mdc(),
            clean_render: self.resolve_clean_render(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let input = config.paths.input.clone().ok_or_else(|| {
            CliError::Validation(
                "No API tree given: pass --input or set `input` in nuxtdoc.toml".to_owned(),
            )
        })?;
        let tree = load_tree(&input)?;
        let renderer = TreeRenderer::new(&config)?;

        if self.dry_run {
            let plan = renderer.plan(&tree)?;
            output.info(&format!(
                "Would write {} files to {}",
                plan.files.len(),
                config.paths.content_dir.display()
            ));
            for file in &plan.files {
                output.item(&file.path);
            }
            return Ok(());
        }

        output.info(&format!(
            "Rendering {} objects into {}",
            tree.len(),
            config.paths.content_dir.display()
        ));
        match renderer.render(&tree) {
            Ok(report) => {
                report_unresolved(&output, &report);
                output.success(&format!("Wrote {} files", report.written.len()));
                Ok(())
            }
            Err(RenderError::Incomplete(report)) => {
                report_unresolved(&output, &report);
                for failure in &report.failed {
                    output.item(&format!("{}: {}", failure.path.display(), failure.message));
                }
                Err(RenderError::Incomplete(report).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve `use_mdc` from --mdc/--no-mdc flags.
    fn resolve_use_mdc(&self) -> Option<bool> {
        self.no_mdc.then_some(false).or(self.mdc)
    }

    /// Resolve `clean_render` from --clean/--no-clean flags.
    fn resolve_clean_render(&self) -> Option<bool> {
        self.no_clean.then_some(false).or(self.clean)
    }
}

/// Read the API tree from a file, or stdin for `-`.
fn load_tree(path: &Path) -> Result<ApiTree, CliError> {
    let json = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            CliError::Validation(format!("Failed to read {}: {e}", path.display()))
        })?
    };
    let tree = ApiTree::from_json(&json)?;
    tracing::debug!(path = %path.display(), objects = tree.len(), "Loaded API tree");
    Ok(tree)
}

fn report_unresolved(output: &Output, report: &RenderReport) {
    if report.unresolved.is_empty() {
        return;
    }
    output.warning(&format!(
        "{} unresolved references left as plain text:",
        report.unresolved.len()
    ));
    for unresolved in &report.unresolved {
        output.item(&format!("{} (in {})", unresolved.reference, unresolved.scope));
    }
}
