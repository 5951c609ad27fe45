//! Split-package detection.
//!
//! An IDE source folder must contain exactly the files the target declares.
//! These scans compare the declared file counts with what is physically on
//! disk, once per parent directory ([`shallow_scan`]) and once per candidate
//! root including all subdirectories ([`deep_scan`]).

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use walkdir::WalkDir;

use crate::error::SrcLayoutError;
use crate::options::AnalysisOptions;
use crate::roots::{GroupedSources, RootContents};
use crate::shared::SharedSources;
use crate::Result;

/// Which scan produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Direct children of one directory
    Shallow,
    /// Everything below a source root
    Deep,
}

/// A directory whose contents are not fully explained by the declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFinding {
    /// Candidate root the directory belongs to (relative)
    pub root: PathBuf,
    /// Directory that was scanned (absolute)
    pub directory: PathBuf,
    /// Declared files
    pub declared: usize,
    /// Source files found on disk
    pub found: usize,
    pub depth: ScanDepth,
}

impl SplitFinding {
    /// Warning text for this finding.
    pub fn message(&self, extension: &str) -> String {
        let scope = match self.depth {
            ScanDepth::Shallow => "",
            ScanDepth::Deep => " (including subfolders)",
        };
        format!(
            "Folder '{}' contains {} .{} files{} but {} are declared. This is a split-package scenario which is challenging to support in IDEs! Consider re-structuring the sources into separate folder hierarchies and build packages.",
            self.directory.display(),
            self.found,
            extension,
            scope,
            self.declared
        )
    }
}

/// Compare declared files with the source files directly inside each parent
/// directory. Directories covered by `shared` are skipped.
pub fn shallow_scan(
    grouped: &GroupedSources,
    base: &Path,
    shared: &SharedSources,
    options: &AnalysisOptions,
) -> Result<Vec<SplitFinding>> {
    let mut findings = Vec::new();

    for (parent, group) in &grouped.by_parent {
        options.cancellation.check()?;
        if group.declared == 0 || shared.covers(parent) {
            continue;
        }

        let directory = base.join(parent);
        let found = count_source_files_in(&directory, options)?;
        tracing::trace!(
            "'{}': {} declared, {} found",
            directory.display(),
            group.declared,
            found
        );
        if found != group.declared {
            findings.push(SplitFinding {
                root: group.root.clone(),
                directory,
                declared: group.declared,
                found,
                depth: ScanDepth::Shallow,
            });
        }
    }

    Ok(findings)
}

/// Compare each file-backed root's declared files with all source files
/// below it. Roots in `already_split` or covered by `shared` are skipped, as
/// are glob-backed roots.
pub fn deep_scan(
    grouped: &GroupedSources,
    base: &Path,
    already_split: &IndexSet<PathBuf>,
    shared: &SharedSources,
    options: &AnalysisOptions,
) -> Result<Vec<SplitFinding>> {
    let mut findings = Vec::new();

    for (root, contents) in &grouped.roots {
        let RootContents::Files(files) = contents else {
            continue;
        };
        if already_split.contains(root) || shared.covers(root) {
            continue;
        }

        let directory = base.join(root);
        let found = count_source_files_below(&directory, options)?;
        tracing::trace!(
            "'{}' (recursive): {} declared, {} found",
            directory.display(),
            files.len(),
            found
        );
        if found != files.len() {
            findings.push(SplitFinding {
                root: root.clone(),
                directory,
                declared: files.len(),
                found,
                depth: ScanDepth::Deep,
            });
        }
    }

    Ok(findings)
}

/// Source file as counted by both scans. Symbolic links resolving to files
/// count even when directory links are not followed.
fn is_source_file(path: &Path, options: &AnalysisOptions) -> bool {
    options.is_source_file_name(path) && path.is_file()
}

/// Count source files directly inside `directory`.
fn count_source_files_in(directory: &Path, options: &AnalysisOptions) -> Result<usize> {
    let scan_error = |source| SrcLayoutError::DirectoryScan {
        path: directory.to_path_buf(),
        source,
    };

    let mut count = 0;
    for entry in fs::read_dir(directory).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        if is_source_file(&path, options) {
            count += 1;
        }
    }
    Ok(count)
}

/// Count source files below `directory`, observing cancellation.
fn count_source_files_below(directory: &Path, options: &AnalysisOptions) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(directory).follow_links(options.follow_links) {
        options.cancellation.check()?;
        let entry = entry.map_err(|e| SrcLayoutError::Walk {
            path: directory.to_path_buf(),
            message: e.to_string(),
        })?;
        if is_source_file(entry.path(), options) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::entry::{GlobEntry, SourceEntry};
    use crate::options::CancellationFlag;
    use crate::package::PackagePathCache;
    use crate::roots::group_by_source_root;
    use std::fs;
    use tempfile::tempdir;

    fn write_java(base: &Path, path: &str, package: &str) {
        let path = base.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("package {package};\n")).unwrap();
    }

    fn group(base: &Path, srcs: &[SourceEntry]) -> GroupedSources {
        group_by_source_root(
            srcs,
            base,
            &mut PackagePathCache::new(),
            &mut Diagnostics::new(),
        )
    }

    #[test]
    fn test_shallow_scan_matching_directory() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");
        fs::write(temp.path().join("src/com/acme/notes.txt"), "not java").unwrap();

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let findings =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &AnalysisOptions::new())
                .unwrap();

        assert!(findings.is_empty());
    }

    #[test]
    fn test_shallow_scan_finds_undeclared_sibling() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");
        write_java(temp.path(), "src/com/acme/Bar.java", "com.acme");

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let findings =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &AnalysisOptions::new())
                .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].root, PathBuf::from("src"));
        assert_eq!(findings[0].declared, 1);
        assert_eq!(findings[0].found, 2);
        assert_eq!(findings[0].depth, ScanDepth::Shallow);
    }

    #[test]
    fn test_shallow_scan_reports_every_directory() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/a/A.java", "a");
        write_java(temp.path(), "src/a/A2.java", "a");
        write_java(temp.path(), "src/b/B.java", "b");
        write_java(temp.path(), "src/b/B2.java", "b");

        let grouped = group(
            temp.path(),
            &[SourceEntry::file("src/a/A.java"), SourceEntry::file("src/b/B.java")],
        );
        let findings =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &AnalysisOptions::new())
                .unwrap();

        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_deep_scan_finds_undeclared_subpackage() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");
        write_java(temp.path(), "src/com/acme/internal/Hidden.java", "com.acme.internal");

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let options = AnalysisOptions::new();
        let shallow =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &options).unwrap();
        assert!(shallow.is_empty());

        let deep = deep_scan(
            &grouped,
            temp.path(),
            &IndexSet::new(),
            &SharedSources::none(),
            &options,
        )
        .unwrap();

        assert_eq!(deep.len(), 1);
        assert_eq!(deep[0].depth, ScanDepth::Deep);
        assert_eq!(deep[0].found, 2);
        assert!(deep[0].message("java").contains("including subfolders"));
    }

    #[test]
    fn test_deep_scan_skips_already_split_roots() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");
        write_java(temp.path(), "src/com/acme/internal/Hidden.java", "com.acme.internal");

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let split: IndexSet<PathBuf> = [PathBuf::from("src")].into_iter().collect();
        let deep = deep_scan(
            &grouped,
            temp.path(),
            &split,
            &SharedSources::none(),
            &AnalysisOptions::new(),
        )
        .unwrap();

        assert!(deep.is_empty());
    }

    #[test]
    fn test_deep_scan_ignores_glob_roots() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");
        write_java(temp.path(), "src/com/acme/Bar.java", "com.acme");

        let glob = GlobEntry::new("src").include(&["**/Foo.java"]).unwrap();
        let grouped = group(temp.path(), &[SourceEntry::Glob(glob)]);
        let deep = deep_scan(
            &grouped,
            temp.path(),
            &IndexSet::new(),
            &SharedSources::none(),
            &AnalysisOptions::new(),
        )
        .unwrap();

        assert!(deep.is_empty());
    }

    #[test]
    fn test_missing_directory_is_a_hard_error() {
        let temp = tempdir().unwrap();
        let grouped = group(temp.path(), &[SourceEntry::file("gone/Foo.java")]);
        let result =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &AnalysisOptions::new());

        assert!(matches!(result, Err(SrcLayoutError::DirectoryScan { .. })));
    }

    #[test]
    fn test_deep_scan_observes_cancellation() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.java", "com.acme");

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let flag = CancellationFlag::new();
        flag.cancel();
        let result = deep_scan(
            &grouped,
            temp.path(),
            &IndexSet::new(),
            &SharedSources::none(),
            &AnalysisOptions::new().cancellation(flag),
        );

        assert!(matches!(result, Err(SrcLayoutError::Cancelled)));
    }

    #[test]
    fn test_counts_only_configured_extension() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "src/com/acme/Foo.kt", "com.acme");
        write_java(temp.path(), "src/com/acme/Other.java", "com.acme");

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.kt")]);
        let options = AnalysisOptions::new().extension("kt");
        let shallow =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &options).unwrap();
        let deep = deep_scan(
            &grouped,
            temp.path(),
            &IndexSet::new(),
            &SharedSources::none(),
            &options,
        )
        .unwrap();

        assert!(shallow.is_empty());
        assert!(deep.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_counts_without_following_links() {
        let temp = tempdir().unwrap();
        write_java(temp.path(), "real/Foo.java", "com.acme");
        fs::create_dir_all(temp.path().join("src/com/acme")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("real/Foo.java"),
            temp.path().join("src/com/acme/Foo.java"),
        )
        .unwrap();

        let grouped = group(temp.path(), &[SourceEntry::file("src/com/acme/Foo.java")]);
        let options = AnalysisOptions::new().follow_links(false);
        let shallow =
            shallow_scan(&grouped, temp.path(), &SharedSources::none(), &options).unwrap();
        let deep = deep_scan(
            &grouped,
            temp.path(),
            &IndexSet::new(),
            &SharedSources::none(),
            &options,
        )
        .unwrap();

        assert!(shallow.is_empty());
        assert!(deep.is_empty());
    }
}
