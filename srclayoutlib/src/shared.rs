//! Source roots already accounted for by a related target.
//!
//! Build targets may compile the same file more than once, e.g. a library
//! exposing all code plus one test target per test class. A test target's
//! roots that lie within the library's resolved roots are not split packages
//! even though the test target declares only a subset of the files.

use std::path::{Path, PathBuf};

use crate::layout::SourceLayout;

/// Resolved source roots of a sibling target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedSources {
    roots: Vec<PathBuf>,
}

impl SharedSources {
    /// No sibling: nothing is covered.
    pub fn none() -> Self {
        Self::default()
    }

    /// Roots resolved by an analyzed sibling. A sibling that fell back has
    /// no source directories and covers nothing.
    pub fn from_layout(layout: &SourceLayout) -> Self {
        Self {
            roots: layout.source_directories().map(Path::to_path_buf).collect(),
        }
    }

    /// Check if `candidate` equals or lies below one of the sibling's roots.
    pub fn covers(&self, candidate: &Path) -> bool {
        self.roots.iter().any(|root| candidate.starts_with(root))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
