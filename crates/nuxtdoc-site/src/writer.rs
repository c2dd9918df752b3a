//! Clean pre-pass and file output.

use std::path::{Path, PathBuf};

use nuxtdoc_renderer::render_document;
use serde_yaml::Mapping;

use crate::RenderError;

/// One file of the output tree, before it is written.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFile {
    /// Path relative to the content root, `/`-separated.
    pub path: String,
    pub frontmatter: Mapping,
    pub body: String,
}

impl RenderedFile {
    /// Full document text: frontmatter block followed by the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontmatter cannot be serialized.
    pub fn contents(&self) -> Result<String, serde_yaml::Error> {
        render_document(&self.frontmatter, &self.body)
    }
}

/// A cross-reference that matched nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Qualified name of the object whose docstring holds the reference.
    pub scope: String,
    pub reference: String,
}

/// A file that could not be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
    pub failed: Vec<WriteFailure>,
    /// References left as plain text, once per scope and reference.
    pub unresolved: Vec<UnresolvedReference>,
}

/// Remove everything inside `dir`, keeping the directory itself.
///
/// A missing directory is not an error.
///
/// # Errors
///
/// Returns [`RenderError::Clean`] naming the first entry that could not be
/// removed.
pub fn clean(dir: &Path) -> Result<(), RenderError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(RenderError::Clean {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    for entry in entries {
        let entry = entry.map_err(|source| RenderError::Clean {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|source| RenderError::Clean {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Removed");
    }
    Ok(())
}

/// Write every file below `root`, continuing past failures.
pub fn write_all(root: &Path, files: &[RenderedFile]) -> (Vec<PathBuf>, Vec<WriteFailure>) {
    let mut written = Vec::with_capacity(files.len());
    let mut failed = Vec::new();

    for file in files {
        let path = root.join(&file.path);
        match write_file(&path, file) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Wrote file");
                written.push(path);
            }
            Err(message) => {
                tracing::warn!(path = %path.display(), error = %message, "Failed to write file");
                failed.push(WriteFailure { path, message });
            }
        }
    }
    (written, failed)
}

fn write_file(path: &Path, file: &RenderedFile) -> Result<(), String> {
    let contents = file.contents().map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(path, contents).map_err(|e| e.to_string())
}
