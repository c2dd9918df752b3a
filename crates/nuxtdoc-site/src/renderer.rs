//! The render pass: plan every output file, then clean and write.

use std::collections::HashSet;
use std::path::Path;

use nuxtdoc_config::Config;
use nuxtdoc_model::{ApiTree, ObjectId, ObjectKind};
use nuxtdoc_renderer::{Formatter, Navigation, PageMeta, layer_frontmatter, table_of_contents};
use serde_yaml::Mapping;

use crate::RenderError;
use crate::layout::{Layout, Placement, walk};
use crate::pages::PageMerger;
use crate::resolver::Resolver;
use crate::writer::{self, RenderReport, RenderedFile, UnresolvedReference};

/// Everything a render pass would write, computed without touching disk.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Files in write order: pages first, then API files in tree order.
    pub files: Vec<RenderedFile>,
    pub unresolved: Vec<UnresolvedReference>,
}

/// Shared state for formatting blocks into files.
pub(crate) struct RenderContext<'a> {
    pub(crate) tree: &'a ApiTree,
    pub(crate) config: &'a Config,
    pub(crate) formatter: &'a Formatter,
    pub(crate) layout: &'a Layout,
    resolver: Resolver<'a>,
    seen: HashSet<(ObjectId, String)>,
    unresolved: Vec<UnresolvedReference>,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        tree: &'a ApiTree,
        config: &'a Config,
        formatter: &'a Formatter,
        layout: &'a Layout,
        base_url: Option<&'a str>,
    ) -> Self {
        Self {
            tree,
            config,
            formatter,
            layout,
            resolver: Resolver::new(tree, layout, base_url),
            seen: HashSet::new(),
            unresolved: Vec::new(),
        }
    }

    /// Format one object for the output file `file`.
    ///
    /// With `anchored`, the block starts with its anchor even when header
    /// anchors are disabled, so page links always have a target.
    pub(crate) fn block(
        &mut self,
        id: ObjectId,
        level: usize,
        file: &str,
        anchored: bool,
    ) -> Result<String, RenderError> {
        let block = self
            .formatter
            .format_object(self.tree, id, level, &self.resolver.scoped(file))?;

        for reference in block.unresolved {
            if self.seen.insert((id, reference.clone())) {
                self.unresolved.push(UnresolvedReference {
                    scope: self.tree.get(id).qualified_name.clone(),
                    reference,
                });
            }
        }

        if anchored && !self.formatter.options().header_anchors {
            let anchor = Formatter::anchor(self.tree.get(id));
            return Ok(format!("<a id=\"{anchor}\"></a>\n\n{}", block.markup));
        }
        Ok(block.markup)
    }

    /// Join body parts and prepend the table of contents when enabled.
    pub(crate) fn body(&self, parts: &[String]) -> String {
        let body = parts
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        let options = self.formatter.options();
        if options.render_toc
            && let Some(toc) = table_of_contents(&body, options.toc_max_depth)
        {
            return format!("{toc}\n\n{body}");
        }
        body
    }

    /// Frontmatter layers in increasing precedence, on top of `meta`.
    pub(crate) fn frontmatter(
        &self,
        meta: &PageMeta,
        layers: &[&Mapping],
    ) -> Result<Mapping, RenderError> {
        let base = meta.to_mapping()?;
        let mut all: Vec<&Mapping> = vec![&base, &self.config.default_frontmatter];
        all.extend_from_slice(layers);
        Ok(layer_frontmatter(&all))
    }

    fn into_unresolved(self) -> Vec<UnresolvedReference> {
        self.unresolved
    }
}

/// Renders an API tree into the configured content directory.
#[derive(Debug)]
pub struct TreeRenderer<'a> {
    config: &'a Config,
    formatter: Formatter,
    /// Absolute link prefix when `absolute_links` is on.
    link_base: Option<String>,
}

impl<'a> TreeRenderer<'a> {
    /// Validate configuration and resolve the component map and icons.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] for invalid configuration.
    pub fn new(config: &'a Config) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            config,
            formatter: Formatter::from_config(config)?,
            link_base: config.absolute_links.then(|| config.link_base()),
        })
    }

    /// Compute every output file without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error for cycles in the tree, page conflicts, unreadable
    /// static page sources, or serialization failures.
    pub fn plan(&self, tree: &ApiTree) -> Result<RenderPlan, RenderError> {
        let visits = walk(tree)?;
        let merger = PageMerger::plan(&self.config.pages, tree, &visits)?;
        let pinned = merger.pinned(tree);
        let layout = Layout::build(tree, visits, &self.config.output_segments(), &pinned);
        merger.check_structural(tree, &layout)?;

        let mut ctx = RenderContext::new(
            tree,
            self.config,
            &self.formatter,
            &layout,
            self.link_base.as_deref(),
        );
        let mut files = merger.assign(&mut ctx, &self.config.paths.project_dir)?;
        for &id in layout.structural() {
            if let Some(placement) = layout.placement(id) {
                files.push(api_file(&mut ctx, id, placement)?);
            }
        }

        Ok(RenderPlan {
            files,
            unresolved: ctx.into_unresolved(),
        })
    }

    /// Run a full pass: plan, clean (when enabled), write.
    ///
    /// Nothing is written unless planning succeeds.
    ///
    /// # Errors
    ///
    /// Returns planning errors, [`RenderError::Clean`] if the pre-pass
    /// fails, and [`RenderError::Incomplete`] if any file failed to write.
    pub fn render(&self, tree: &ApiTree) -> Result<RenderReport, RenderError> {
        let plan = self.plan(tree)?;
        let root: &Path = &self.config.paths.content_dir;
        tracing::info!(
            files = plan.files.len(),
            root = %root.display(),
            clean = self.config.clean_render,
            "Rendering API documentation"
        );

        if self.config.clean_render {
            writer::clean(root)?;
        }
        let (written, failed) = writer::write_all(root, &plan.files);

        for unresolved in &plan.unresolved {
            tracing::warn!(
                scope = %unresolved.scope,
                reference = %unresolved.reference,
                "Unresolved reference"
            );
        }

        let report = RenderReport {
            written,
            failed,
            unresolved: plan.unresolved,
        };
        if !report.failed.is_empty() {
            return Err(RenderError::Incomplete(report));
        }
        tracing::info!(written = report.written.len(), "Render complete");
        Ok(report)
    }
}

/// Structural file of a module, class or leaf object.
fn api_file(
    ctx: &mut RenderContext<'_>,
    id: ObjectId,
    placement: &Placement,
) -> Result<RenderedFile, RenderError> {
    let tree = ctx.tree;
    let object = tree.get(id);

    let mut parts = vec![ctx.block(id, 0, &placement.file, false)?];
    if tree.is_container(id) {
        for &member in tree.members(id) {
            if tree.get(member).kind == ObjectKind::Argument || ctx.layout.is_pinned(member) {
                continue;
            }
            parts.push(ctx.block(member, 2, &placement.file, false)?);
        }
    }

    let meta = PageMeta::new(
        ctx.formatter.title(object).to_owned(),
        object.summary().map(str::to_owned),
        Navigation {
            title: object.name.clone(),
            icon: ctx.formatter.icons().icon(object.kind).to_owned(),
            level: ctx.layout.depth(id),
            order: Some(sibling_position(tree, id)),
        },
    );

    Ok(RenderedFile {
        path: placement.file.clone(),
        frontmatter: ctx.frontmatter(&meta, &[&object.frontmatter])?,
        body: ctx.body(&parts),
    })
}

/// 1-based position among non-argument siblings (roots among roots).
fn sibling_position(tree: &ApiTree, id: ObjectId) -> i64 {
    let siblings = tree.parent(id).map_or(tree.roots(), |p| tree.members(p));
    let position = siblings
        .iter()
        .filter(|&&s| tree.get(s).kind != ObjectKind::Argument)
        .position(|&s| s == id)
        .unwrap_or_default();
    i64::try_from(position + 1).unwrap_or(i64::MAX)
}
