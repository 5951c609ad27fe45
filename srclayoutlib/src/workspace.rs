//! Analysis of every target in a manifest.
//!
//! Targets that share sources with another target are analyzed after it,
//! so the shared layout is available to suppress split-package findings.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::error::SrcLayoutError;
use crate::layout::SourceLayout;
use crate::manifest::{Manifest, TargetSpec};
use crate::options::AnalysisOptions;
use crate::source_info::SourceInfo;
use crate::Result;

/// Result of analyzing one target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub name: String,
    pub base: PathBuf,
    pub diagnostics: Diagnostics,
    /// The published layout, or the error that aborted this target
    pub result: Result<Arc<SourceLayout>>,
}

impl TargetOutcome {
    pub fn layout(&self) -> Option<&SourceLayout> {
        self.result.as_deref().ok()
    }
}

/// Check names are unique, sharing references resolve and contain no cycle.
pub fn validate(manifest: &Manifest) -> Result<()> {
    let mut by_name: HashMap<&str, &TargetSpec> = HashMap::new();
    for target in &manifest.targets {
        if by_name.insert(target.name.as_str(), target).is_some() {
            return Err(SrcLayoutError::DuplicateTarget(target.name.clone()));
        }
    }

    for target in &manifest.targets {
        let mut chain = vec![target.name.clone()];
        let mut current = target;
        while let Some(shared) = &current.shares_sources_with {
            let Some(next) = by_name.get(shared.as_str()) else {
                return Err(SrcLayoutError::UnknownTarget {
                    target: current.name.clone(),
                    shared: shared.clone(),
                });
            };
            if chain.contains(&next.name) {
                chain.push(next.name.clone());
                return Err(SrcLayoutError::SharingCycle(chain));
            }
            chain.push(next.name.clone());
            current = next;
        }
    }

    Ok(())
}

/// Analyze every target of `manifest`.
///
/// Outcomes are returned in manifest order. A target failing hard does not
/// stop the others; cancellation stops the whole run.
pub fn analyze_manifest(
    manifest: &Manifest,
    options: &AnalysisOptions,
) -> Result<Vec<TargetOutcome>> {
    validate(manifest)?;

    let mut outcomes: HashMap<&str, TargetOutcome> = HashMap::new();
    let mut done: HashSet<&str> = HashSet::new();

    while done.len() < manifest.targets.len() {
        for target in &manifest.targets {
            if done.contains(target.name.as_str()) {
                continue;
            }
            let shared = match &target.shares_sources_with {
                Some(name) if !done.contains(name.as_str()) => continue,
                Some(name) => outcomes.get(name.as_str()),
                None => None,
            };

            let outcome = analyze_target(target, shared, options)?;
            done.insert(target.name.as_str());
            outcomes.insert(target.name.as_str(), outcome);
        }
    }

    Ok(manifest
        .targets
        .iter()
        .filter_map(|target| outcomes.remove(target.name.as_str()))
        .collect())
}

fn analyze_target(
    target: &TargetSpec,
    shared: Option<&TargetOutcome>,
    options: &AnalysisOptions,
) -> Result<TargetOutcome> {
    let mut diagnostics = Diagnostics::new();
    let _span = tracing::info_span!("target", name = %target.name).entered();

    let result = target.entries().and_then(|entries| {
        let mut info = SourceInfo::new(entries, &target.base);
        match shared {
            Some(TargetOutcome {
                result: Ok(layout), ..
            }) => info = info.with_shared_sources(Arc::clone(layout)),
            Some(failed) => diagnostics.warning(format!(
                "Target '{}' shares sources with '{}' which could not be analyzed; split packages are reported without considering shared sources.",
                target.name, failed.name
            )),
            None => {}
        }
        info.analyze(options, &mut diagnostics)
    });

    if let Err(SrcLayoutError::Cancelled) = result {
        return Err(SrcLayoutError::Cancelled);
    }

    Ok(TargetOutcome {
        name: target.name.clone(),
        base: target.base.clone(),
        diagnostics,
        result,
    })
}
