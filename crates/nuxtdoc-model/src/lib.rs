//! API object model for nuxtdoc.
//!
//! Provides the read-only [`ApiTree`] the renderer walks, the JSON input
//! contract ([`ObjectSpec`]) used by the upstream pipeline, and the naming
//! utilities that turn qualified names into output paths.

mod naming;
mod tree;

pub use naming::{NamingError, qualified_to_path, to_component_tag, to_slug};
pub use tree::{ApiObject, ApiTree, ObjectId, ObjectKind, ObjectSpec, TreeError};
