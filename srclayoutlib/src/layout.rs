//! The published result of analyzing one target's sources.

use std::path::{Path, PathBuf};

use glob::Pattern;
use indexmap::{IndexMap, IndexSet};

use crate::entry::FileEntry;
use crate::error::SrcLayoutError;
use crate::package::PackagePath;
use crate::roots::RootContents;
use crate::Result;

/// Source directories and fallback files of an analyzed target.
///
/// A layout is either *consistent* (directories were resolved, possibly with
/// a few non-conforming files on the side) or a *fallback* (a split package
/// was found and every declared file is listed individually).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLayout {
    directories: IndexMap<PathBuf, RootContents>,
    without_common_root: Vec<FileEntry>,
    split_roots: Vec<PathBuf>,
}

impl SourceLayout {
    pub(crate) fn consistent(
        directories: IndexMap<PathBuf, RootContents>,
        without_common_root: Vec<FileEntry>,
    ) -> Self {
        Self {
            directories,
            without_common_root,
            split_roots: Vec::new(),
        }
    }

    pub(crate) fn fallback(files: Vec<FileEntry>, split_roots: Vec<PathBuf>) -> Self {
        Self {
            directories: IndexMap::new(),
            without_common_root: files,
            split_roots,
        }
    }

    /// Whether the target fell back to listing every file individually.
    pub fn is_fallback(&self) -> bool {
        !self.split_roots.is_empty()
    }

    /// Roots whose split-package findings forced the fallback.
    pub fn split_roots(&self) -> &[PathBuf] {
        &self.split_roots
    }

    /// Detected source directories, relative to the target's base directory.
    pub fn source_directories(&self) -> impl Iterator<Item = &Path> {
        self.directories.keys().map(PathBuf::as_path)
    }

    pub fn directories(&self) -> impl Iterator<Item = (&Path, &RootContents)> {
        self.directories
            .iter()
            .map(|(root, contents)| (root.as_path(), contents))
    }

    pub fn contents(&self, source_directory: &Path) -> Option<&RootContents> {
        self.directories.get(source_directory)
    }

    pub fn has_source_directories(&self) -> bool {
        !self.directories.is_empty()
    }

    pub fn files_without_common_root(&self) -> &[FileEntry] {
        &self.without_common_root
    }

    pub fn has_files_without_common_root(&self) -> bool {
        !self.without_common_root.is_empty()
    }

    /// Distinct packages over all file-backed source directories.
    pub fn detected_packages(&self) -> Vec<&PackagePath> {
        let packages: IndexSet<&PackagePath> = self
            .directories
            .values()
            .filter_map(RootContents::files)
            .flat_map(|files| files.iter().filter_map(FileEntry::detected_package))
            .collect();
        packages.into_iter().collect()
    }

    /// Distinct packages of one source directory; empty for glob roots.
    pub fn detected_packages_for(&self, source_directory: &Path) -> Result<Vec<&PackagePath>> {
        let packages: IndexSet<&PackagePath> = match self.lookup(source_directory)? {
            RootContents::Files(files) => files
                .iter()
                .filter_map(FileEntry::detected_package)
                .collect(),
            RootContents::Glob(_) => IndexSet::new(),
        };
        Ok(packages.into_iter().collect())
    }

    /// Include patterns of a glob-backed directory. `None` means include
    /// everything (file roots, or globs without includes).
    pub fn inclusion_patterns(&self, source_directory: &Path) -> Result<Option<&[Pattern]>> {
        Ok(match self.lookup(source_directory)? {
            RootContents::Glob(glob) => glob.include_patterns(),
            RootContents::Files(_) => None,
        })
    }

    /// Exclude patterns of a glob-backed directory. `None` means exclude
    /// nothing.
    pub fn exclusion_patterns(&self, source_directory: &Path) -> Result<Option<&[Pattern]>> {
        Ok(match self.lookup(source_directory)? {
            RootContents::Glob(glob) => glob.exclude_patterns(),
            RootContents::Files(_) => None,
        })
    }

    fn lookup(&self, source_directory: &Path) -> Result<&RootContents> {
        self.directories
            .get(source_directory)
            .ok_or_else(|| SrcLayoutError::UnknownSourceDirectory(source_directory.to_path_buf()))
    }
}
