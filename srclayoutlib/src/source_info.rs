//! Analysis of one target's declared sources.
//!
//! [`SourceInfo`] runs the whole pipeline exactly once:
//!
//! 1. detect packages and group entries by candidate source root
//! 2. scan parent directories, then whole roots, for undeclared files
//! 3. drop findings covered by a sibling target's resolved roots
//! 4. publish either the grouped roots or an all-files fallback
//!
//! ## Example
//!
//! ```rust,ignore
//! use srclayoutlib::{AnalysisOptions, Diagnostics, SourceEntry, SourceInfo};
//!
//! let mut library = SourceInfo::new(vec![SourceEntry::file("src/main/java/com/acme/Foo.java")], "app");
//! let mut diagnostics = Diagnostics::new();
//! let layout = library.analyze(&AnalysisOptions::new(), &mut diagnostics)?;
//!
//! let mut test = SourceInfo::new(vec![SourceEntry::file("src/main/java/com/acme/Foo.java")], "app")
//!     .with_shared_sources(layout);
//! test.analyze(&AnalysisOptions::new(), &mut diagnostics)?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::diagnostics::Diagnostics;
use crate::entry::SourceEntry;
use crate::layout::SourceLayout;
use crate::options::AnalysisOptions;
use crate::package::PackagePathCache;
use crate::roots::group_by_source_root;
use crate::shared::SharedSources;
use crate::split::{deep_scan, shallow_scan};
use crate::Result;

/// Declared sources of one build target and, once analyzed, their layout.
#[derive(Debug)]
pub struct SourceInfo {
    srcs: Vec<SourceEntry>,
    base: PathBuf,
    shared: Option<Arc<SourceLayout>>,
    packages: PackagePathCache,
    layout: Option<Arc<SourceLayout>>,
}

impl SourceInfo {
    /// Sources of a target rooted at `base` (the build package directory).
    pub fn new(srcs: Vec<SourceEntry>, base: impl Into<PathBuf>) -> Self {
        Self {
            srcs,
            base: base.into(),
            shared: None,
            packages: PackagePathCache::new(),
            layout: None,
        }
    }

    /// Consult another target's layout to suppress split-package findings
    /// for roots that target already resolved.
    ///
    /// Build tools allow compiling one file in several targets, e.g. a
    /// library with all code plus one test target per test class.
    pub fn with_shared_sources(mut self, shared: Arc<SourceLayout>) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn srcs(&self) -> &[SourceEntry] {
        &self.srcs
    }

    pub fn is_analyzed(&self) -> bool {
        self.layout.is_some()
    }

    /// The published layout; `None` until [`analyze`](Self::analyze) succeeded.
    pub fn layout(&self) -> Option<&Arc<SourceLayout>> {
        self.layout.as_ref()
    }

    /// Analyze the declared sources and publish the layout.
    ///
    /// Layout problems are reported to `diagnostics`. Errors are returned only
    /// when a directory cannot be listed or searched, or when the analysis is
    /// cancelled; the instance then stays unanalyzed. Once a layout was
    /// published, further calls return it without touching the filesystem.
    pub fn analyze(
        &mut self,
        options: &AnalysisOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Arc<SourceLayout>> {
        if let Some(layout) = &self.layout {
            return Ok(Arc::clone(layout));
        }

        let _span = tracing::debug_span!("analyze", base = %self.base.display()).entered();

        let shared = self
            .shared
            .as_deref()
            .map(SharedSources::from_layout)
            .unwrap_or_default();

        let grouped = group_by_source_root(&self.srcs, &self.base, &mut self.packages, diagnostics);

        let mut split_roots: IndexSet<PathBuf> = IndexSet::new();
        for finding in shallow_scan(&grouped, &self.base, &shared, options)? {
            diagnostics.warning(finding.message(&options.extension));
            split_roots.insert(finding.root);
        }
        for finding in deep_scan(&grouped, &self.base, &split_roots, &shared, options)? {
            diagnostics.warning(finding.message(&options.extension));
            split_roots.insert(finding.root);
        }

        split_roots.retain(|root| !shared.covers(root));

        let layout = if split_roots.is_empty() {
            SourceLayout::consistent(grouped.roots, grouped.non_conforming)
        } else {
            tracing::debug!(
                "{} split root(s), listing all files individually",
                split_roots.len()
            );
            let files = self
                .srcs
                .iter()
                .filter_map(SourceEntry::as_file)
                .cloned()
                .collect();
            SourceLayout::fallback(files, split_roots.into_iter().collect())
        };

        let layout = Arc::new(layout);
        self.layout = Some(Arc::clone(&layout));
        Ok(layout)
    }
}
