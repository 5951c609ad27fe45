//! Configuration for source-layout analysis.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SrcLayoutError;
use crate::Result;

/// Extension of the source files the engine reasons about.
pub const DEFAULT_EXTENSION: &str = "java";

/// Caller-controlled signal for aborting a running analysis.
///
/// Clones share the same flag, so a handle can be given to a signal handler
/// while the analysis holds another.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every analysis observing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SrcLayoutError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Options for analyzing a target's source declarations.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Extension (without the dot) of files counted by the split-package scan
    pub extension: String,
    /// Whether the recursive scan follows symbolic links
    pub follow_links: bool,
    /// Cancellation signal observed by directory scans
    pub cancellation: CancellationFlag,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            follow_links: true,
            cancellation: CancellationFlag::new(),
        }
    }
}

impl AnalysisOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source file extension. A leading dot is ignored.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set whether symbolic links are followed during recursive scans.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Observe the given cancellation flag.
    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Check if a file name carries the configured source extension.
    pub fn is_source_file_name(&self, path: &std::path::Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }
}
