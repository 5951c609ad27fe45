//! Declared source entries of a build target.
//!
//! A target declares its sources as explicit files, as globs over a
//! directory, or as references to other build labels. Paths are relative to
//! the target's base directory.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use glob::Pattern;

use crate::error::SrcLayoutError;
use crate::package::PackagePath;
use crate::Result;

/// Drop `.` components so `./src` and `src` name the same directory.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| *component != Component::CurDir)
        .collect()
}

/// One entry of a target's declared sources.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEntry {
    /// A single declared file
    File(FileEntry),
    /// A directory with include/exclude patterns
    Glob(GlobEntry),
    /// A reference the engine cannot resolve to files (e.g. a build label)
    Label(String),
}

impl SourceEntry {
    /// Shorthand for a file entry.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceEntry::File(FileEntry::new(path))
    }

    pub fn label(label: impl Into<String>) -> Self {
        SourceEntry::Label(label.into())
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            SourceEntry::File(file) => Some(file),
            _ => None,
        }
    }
}

impl From<FileEntry> for SourceEntry {
    fn from(file: FileEntry) -> Self {
        SourceEntry::File(file)
    }
}

impl From<GlobEntry> for SourceEntry {
    fn from(glob: GlobEntry) -> Self {
        SourceEntry::Glob(glob)
    }
}

impl fmt::Display for SourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEntry::File(file) => write!(f, "{}", file.path().display()),
            SourceEntry::Glob(glob) => write!(f, "glob({})", glob.directory().display()),
            SourceEntry::Label(label) => f.write_str(label),
        }
    }
}

/// A declared source file.
///
/// The detected package path is filled in at most once during analysis.
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: PathBuf,
    parent: PathBuf,
    detected_package: OnceLock<PackagePath>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = normalize(&path.into());
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            parent,
            detected_package: OnceLock::new(),
        }
    }

    /// Path relative to the target's base directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the file, relative to the base directory.
    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Absolute location of the file for a given base directory.
    pub fn location(&self, base: &Path) -> PathBuf {
        base.join(&self.path)
    }

    /// Package detected for this file, once analysis has looked at it.
    pub fn detected_package(&self) -> Option<&PackagePath> {
        self.detected_package.get()
    }

    /// Fill the package slot; a slot that is already set keeps its value.
    pub(crate) fn record_package(&self, package: PackagePath) -> &PackagePath {
        self.detected_package.get_or_init(|| package)
    }

    /// Source root implied by the detected package, if the file lives in a
    /// directory hierarchy mirroring its package.
    pub fn potential_source_root(&self) -> Option<PathBuf> {
        let package = self.detected_package()?;
        package.strip_from(&self.parent)
    }
}

impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileEntry {}

/// A glob declaration: a directory plus optional include/exclude patterns.
#[derive(Debug, Clone)]
pub struct GlobEntry {
    directory: PathBuf,
    include: Option<Vec<Pattern>>,
    exclude: Option<Vec<Pattern>>,
}

impl GlobEntry {
    /// Create a glob entry without patterns (everything below `directory`).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: normalize(&directory.into()),
            include: None,
            exclude: None,
        }
    }

    /// Set the include patterns.
    pub fn include<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        self.include = Some(compile_patterns(patterns)?);
        Ok(self)
    }

    /// Set the exclude patterns.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        self.exclude = Some(compile_patterns(patterns)?);
        Ok(self)
    }

    /// Directory the patterns apply to, relative to the base directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn include_patterns(&self) -> Option<&[Pattern]> {
        self.include.as_deref()
    }

    pub fn exclude_patterns(&self) -> Option<&[Pattern]> {
        self.exclude.as_deref()
    }
}

impl PartialEq for GlobEntry {
    fn eq(&self, other: &Self) -> bool {
        fn as_strs(patterns: &Option<Vec<Pattern>>) -> Option<Vec<&str>> {
            patterns
                .as_ref()
                .map(|p| p.iter().map(Pattern::as_str).collect())
        }

        self.directory == other.directory
            && as_strs(&self.include) == as_strs(&other.include)
            && as_strs(&self.exclude) == as_strs(&other.exclude)
    }
}

fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Pattern::new(pattern).map_err(|e| SrcLayoutError::InvalidGlob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}
