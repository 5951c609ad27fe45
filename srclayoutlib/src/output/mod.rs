//! Output formatting: present analyzed targets as reports.
//!
//! `TargetReport` is a pure presentation layer. It turns a `TargetOutcome`
//! into plain strings and lists that templates and JSON output consume
//! directly; no analysis happens here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use srclayoutlib::output::TargetReport;
//!
//! let outcomes = analyze_manifest(&manifest, &AnalysisOptions::new())?;
//! let reports: Vec<TargetReport> = outcomes.iter().map(TargetReport::from_outcome).collect();
//! println!("{}", serde_json::to_string_pretty(&reports)?);
//! ```

pub mod report;

pub use report::{DirectoryKind, DirectoryReport, LayoutState, TargetReport};
