//! Error types for srclayoutlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or analyzing source declarations.
///
/// Layout problems (split packages, conflicting roots, files outside their
/// package hierarchy) are not errors; they are reported through
/// [`Diagnostics`](crate::Diagnostics). Only filesystem failures while
/// scanning a candidate root abort an analysis.
#[derive(Error, Debug)]
pub enum SrcLayoutError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Listing a directory's contents failed
    #[error("error searching files in '{path}': {source}")]
    DirectoryScan {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Recursive search below a source root failed
    #[error("error searching files in '{path}': {message}")]
    Walk { path: PathBuf, message: String },

    /// Analysis was cancelled by the caller
    #[error("analysis cancelled")]
    Cancelled,

    /// A source directory was queried that the layout does not contain
    #[error("source directory '{0}' unknown")]
    UnknownSourceDirectory(PathBuf),

    /// A manifest references a target it does not declare
    #[error("target '{target}' shares sources with unknown target '{shared}'")]
    UnknownTarget { target: String, shared: String },

    /// A manifest declares the same target name twice
    #[error("target '{0}' is declared more than once")]
    DuplicateTarget(String),

    /// Targets share sources with each other in a loop
    #[error("targets share sources in a cycle: {}", .0.join(" -> "))]
    SharingCycle(Vec<String>),

    /// Failed to parse a target manifest
    #[error("failed to parse manifest '{path}': {message}")]
    ManifestParse { path: PathBuf, message: String },
}
