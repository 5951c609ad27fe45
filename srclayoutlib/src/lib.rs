//! # srclayoutlib
//!
//! Infers IDE source directories from the files a build target declares,
//! and detects split packages that make such directories unsafe.
//!
//! ## Overview
//!
//! An IDE wants a handful of source folders; a build target declares a flat
//! list of files, globs and labels. For each declared file the library reads
//! its `package` declaration and strips the package path from the file's
//! parent directory, yielding a candidate **source root**:
//!
//! - `src/main/java/com/acme/Foo.java` declaring `package com.acme;`
//!   implies the root `src/main/java`
//! - A glob over a directory is its own root
//! - Build labels are reported but cannot be resolved
//!
//! A root is only usable if it contains exactly the declared files. When a
//! directory holds source files the target does not declare (a **split
//! package**), the whole target falls back to listing its files
//! individually. Files intentionally shared with a sibling target are exempt
//! from that check.
//!
//! ## Features
//!
//! - **Package detection**: a streaming lexer that skips comments and string
//!   literals, memoized per directory
//! - **Split-package detection**: per-directory and recursive scans
//! - **Shared sources**: suppress findings covered by an analyzed sibling
//! - **Manifests**: analyze a set of targets from a JSON document
//!
//! ## Example
//!
//! ```rust
//! use srclayoutlib::{AnalysisOptions, Diagnostics, SourceEntry, SourceInfo};
//! use std::fs;
//! use std::path::Path;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let package = dir.path().join("src/com/acme");
//! fs::create_dir_all(&package).unwrap();
//! fs::write(package.join("Foo.java"), "package com.acme;\nclass Foo {}\n").unwrap();
//!
//! let mut info = SourceInfo::new(vec![SourceEntry::file("src/com/acme/Foo.java")], dir.path());
//! let mut diagnostics = Diagnostics::new();
//! let layout = info.analyze(&AnalysisOptions::new(), &mut diagnostics).unwrap();
//!
//! assert!(!layout.is_fallback());
//! assert_eq!(layout.source_directories().collect::<Vec<_>>(), vec![Path::new("src")]);
//! assert!(diagnostics.is_empty());
//! ```

pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod options;
pub mod output;
pub mod package;
pub mod roots;
pub mod shared;
pub mod source_info;
pub mod split;
pub mod workspace;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use entry::{FileEntry, GlobEntry, SourceEntry};
pub use error::SrcLayoutError;
pub use layout::SourceLayout;
pub use manifest::{GlobSpec, GlobSrc, LabelSrc, Manifest, SrcSpec, TargetSpec};
pub use options::{AnalysisOptions, CancellationFlag, DEFAULT_EXTENSION};
pub use output::{DirectoryKind, DirectoryReport, LayoutState, TargetReport};
pub use package::{read_package_path, scan_package_path, PackagePath, PackagePathCache};
pub use roots::{group_by_source_root, GroupedSources, RootContents};
pub use shared::SharedSources;
pub use source_info::SourceInfo;
pub use split::{ScanDepth, SplitFinding};
pub use workspace::{analyze_manifest, validate, TargetOutcome};

/// Result type for srclayoutlib operations.
pub type Result<T> = std::result::Result<T, SrcLayoutError>;
