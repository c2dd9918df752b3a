//! Markdown and MDC formatting for nuxtdoc.
//!
//! Turns single API objects into markup blocks ([`Formatter`]), merges
//! frontmatter layers and provides the link helpers the site layer uses.
//! Cross-references are resolved through a [`LinkResolver`] supplied by the
//! caller, bound to the file being written.

mod crossref;
mod docstring;
mod formatter;
mod frontmatter;
pub mod mdc;
mod scan;
mod toc;
mod util;

use nuxtdoc_model::ObjectId;

pub use formatter::{FieldItem, FormattedBlock, Formatter};
pub use frontmatter::{
    Navigation, PageMeta, ReferenceHeader, Seo, layer_frontmatter, merge_frontmatter, render_document,
};
pub use toc::table_of_contents;
pub use util::relative_path;

/// Resolves cross-references to links.
pub trait LinkResolver {
    /// Link to the object `reference` names as seen from `scope`, or
    /// `None` when nothing matches.
    fn resolve(&self, scope: ObjectId, reference: &str) -> Option<String>;
}

/// Resolver that never resolves; every reference renders as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl LinkResolver for NullResolver {
    fn resolve(&self, _scope: ObjectId, _reference: &str) -> Option<String> {
        None
    }
}
