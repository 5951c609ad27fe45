//! Target manifests: the declared sources of a set of build targets.
//!
//! A manifest is a JSON document exported from build metadata:
//!
//! ```json
//! {
//!   "targets": [
//!     { "name": "//app:lib", "base": "app", "srcs": ["src/main/java/com/acme/Foo.java"] },
//!     {
//!       "name": "//app:test",
//!       "base": "app",
//!       "srcs": [
//!         "src/test/java/com/acme/FooTest.java",
//!         { "glob": { "dir": "src/test/resources", "exclude": ["**/*.bak"] } },
//!         { "label": "//app:generated" }
//!       ],
//!       "shares_sources_with": "//app:lib"
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entry::{GlobEntry, SourceEntry};
use crate::error::SrcLayoutError;
use crate::Result;

/// A set of targets to analyze together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub targets: Vec<TargetSpec>,
}

/// One build target's declared sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    pub name: String,
    /// Build package directory; relative paths resolve against the manifest
    #[serde(default)]
    pub base: PathBuf,
    pub srcs: Vec<SrcSpec>,
    /// Target whose resolved source roots this target reuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_sources_with: Option<String>,
}

/// A declared source as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SrcSpec {
    /// A file path, or a build label (`//pkg:name`, `:name`, `@repo//...`)
    Path(String),
    Glob(GlobSrc),
    Label(LabelSrc),
}

/// `{ "glob": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobSrc {
    pub glob: GlobSpec,
}

/// `{ "label": "//pkg:name" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelSrc {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobSpec {
    pub dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

fn is_label(path: &str) -> bool {
    path.starts_with("//") || path.starts_with(':') || path.starts_with('@')
}

impl SrcSpec {
    /// Convert into an engine entry, validating glob patterns.
    pub fn to_entry(&self) -> Result<SourceEntry> {
        Ok(match self {
            SrcSpec::Path(path) if is_label(path) => SourceEntry::label(path.as_str()),
            SrcSpec::Path(path) => SourceEntry::file(path.as_str()),
            SrcSpec::Label(LabelSrc { label }) => SourceEntry::label(label.as_str()),
            SrcSpec::Glob(GlobSrc { glob }) => {
                let mut entry = GlobEntry::new(&glob.dir);
                if let Some(include) = &glob.include {
                    entry = entry.include(include)?;
                }
                if let Some(exclude) = &glob.exclude {
                    entry = entry.exclude(exclude)?;
                }
                SourceEntry::Glob(entry)
            }
        })
    }
}

impl TargetSpec {
    /// All declared sources as engine entries.
    pub fn entries(&self) -> Result<Vec<SourceEntry>> {
        self.srcs.iter().map(SrcSpec::to_entry).collect()
    }
}

impl Manifest {
    /// Read a manifest file. Relative target bases are resolved against the
    /// directory containing the manifest.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SrcLayoutError::PathNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| SrcLayoutError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(&content, root).map_err(|e| match e {
            SrcLayoutError::ManifestParse { message, .. } => SrcLayoutError::ManifestParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse manifest JSON, resolving relative bases against `root`.
    pub fn from_json(json: &str, root: &Path) -> Result<Self> {
        let mut manifest: Manifest =
            serde_json::from_str(json).map_err(|e| SrcLayoutError::ManifestParse {
                path: PathBuf::new(),
                message: e.to_string(),
            })?;

        for target in &mut manifest.targets {
            if target.base.is_relative() {
                target.base = root.join(&target.base);
            }
        }

        Ok(manifest)
    }

    pub fn target(&self, name: &str) -> Option<&TargetSpec> {
        self.targets.iter().find(|t| t.name == name)
    }
}
