//! Report-ready data for one analyzed target.
//!
//! The data flow is:
//! 1. Declared sources (Manifest, TargetSpec)
//! 2. Analysis (TargetOutcome with its SourceLayout and Diagnostics)
//! 3. TargetReport (strings and lists for display or JSON)

use std::path::{Component, Path};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};
use crate::layout::SourceLayout;
use crate::roots::RootContents;
use crate::workspace::TargetOutcome;

/// Overall result of a target's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutState {
    /// Source directories were resolved
    Consistent,
    /// A split package was found; every file is listed individually
    Fallback,
    /// The analysis aborted with an error
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryKind {
    Files,
    Glob,
}

/// One proposed source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryReport {
    pub path: String,
    pub kind: DirectoryKind,
    /// Declared files (file roots only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Distinct packages, in path form (`com/acme`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

/// Report-ready summary of a [`TargetOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub base: String,
    pub state: LayoutState,
    pub source_directories: Vec<DirectoryReport>,
    pub files_without_common_root: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub split_roots: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetReport {
    pub fn from_outcome(outcome: &TargetOutcome) -> Self {
        let mut report = TargetReport {
            name: outcome.name.clone(),
            base: display(&outcome.base),
            state: LayoutState::Failed,
            source_directories: Vec::new(),
            files_without_common_root: Vec::new(),
            split_roots: Vec::new(),
            diagnostics: outcome.diagnostics.iter().cloned().collect(),
            error: None,
        };

        match &outcome.result {
            Ok(layout) => report.fill_layout(layout),
            Err(e) => report.error = Some(e.to_string()),
        }
        report
    }

    fn fill_layout(&mut self, layout: &SourceLayout) {
        self.state = if layout.is_fallback() {
            LayoutState::Fallback
        } else {
            LayoutState::Consistent
        };
        self.source_directories = layout
            .directories()
            .map(|(path, contents)| directory_report(path, contents))
            .collect();
        self.files_without_common_root = layout
            .files_without_common_root()
            .iter()
            .map(|file| display(file.path()))
            .collect();
        self.split_roots = layout.split_roots().iter().map(|p| display(p)).collect();
    }

    /// Whether the report should fail a strict run.
    pub fn is_strict_failure(&self) -> bool {
        self.state != LayoutState::Consistent
            || self
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error)
    }
}

fn directory_report(path: &Path, contents: &RootContents) -> DirectoryReport {
    match contents {
        RootContents::Files(files) => {
            let mut packages: Vec<String> = Vec::new();
            for package in files.iter().filter_map(|f| f.detected_package()) {
                let package = display(&package.to_path());
                if !packages.contains(&package) {
                    packages.push(package);
                }
            }
            DirectoryReport {
                path: display(path),
                kind: DirectoryKind::Files,
                files: files.iter().map(|f| display(f.path())).collect(),
                packages,
                include: None,
                exclude: None,
            }
        }
        RootContents::Glob(glob) => {
            let patterns =
                |p: Option<&[glob::Pattern]>| p.map(|p| p.iter().map(|p| p.to_string()).collect());
            DirectoryReport {
                path: display(path),
                kind: DirectoryKind::Glob,
                files: Vec::new(),
                packages: Vec::new(),
                include: patterns(glob.include_patterns()),
                exclude: patterns(glob.exclude_patterns()),
            }
        }
    }
}

/// Forward-slash rendering so reports read the same on every platform.
fn display(path: &Path) -> String {
    let mut rendered = String::new();
    for component in path.components() {
        if component == Component::RootDir {
            rendered.push('/');
            continue;
        }
        if !rendered.is_empty() && !rendered.ends_with('/') {
            rendered.push('/');
        }
        rendered.push_str(&component.as_os_str().to_string_lossy());
    }
    rendered
}
