//! Output tree assembly for nuxtdoc.
//!
//! Walks an [`ApiTree`](nuxtdoc_model::ApiTree), decides where every object
//! lands ([`Layout`]), merges configured pages ([`PageMerger`]), resolves
//! cross-references relative to the file being written ([`Resolver`]) and
//! writes the result ([`TreeRenderer`]).
//!
//! A pass is single-threaded and must not run concurrently with another
//! pass targeting the same content directory: the clean step deletes
//! before writing.
//!
//! # Example
//!
//! ```no_run
//! use nuxtdoc_config::Config;
//! use nuxtdoc_model::ApiTree;
//! use nuxtdoc_site::TreeRenderer;
//!
//! let config = Config::load(None, None)?;
//! let tree = ApiTree::from_json(r#"[{"name": "app", "members": []}]"#)?;
//! let report = TreeRenderer::new(&config)?.render(&tree)?;
//! println!("wrote {} files", report.written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod layout;
mod pages;
mod renderer;
mod resolver;
mod selection;
mod writer;

pub use error::RenderError;
pub use layout::{Layout, Placement, Visit, walk};
pub use pages::PageMerger;
pub use renderer::{RenderPlan, TreeRenderer};
pub use resolver::{Resolver, ScopedResolver};
pub use selection::select;
pub use writer::{RenderReport, RenderedFile, UnresolvedReference, WriteFailure, clean, write_all};
