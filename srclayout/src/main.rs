//! # srclayout
//!
//! A CLI tool that proposes IDE source directories for build targets and
//! reports split packages.
//!
//! ## Overview
//!
//! srclayout is built on top of srclayoutlib. It reads a manifest of build
//! targets and their declared sources, analyzes every target, and prints
//! the detected source directories, the files that could not be placed
//! under a common root, and any split-package warnings.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze every target in ./srclayout.json
//! srclayout
//!
//! # Analyze a specific manifest, print two targets only
//! srclayout build/targets.json --target //app:lib --target //app:test
//!
//! # Kotlin sources, JSON output
//! srclayout --extension kt --output json
//!
//! # Fail if any target falls back or reports an error
//! srclayout --strict
//! ```

mod render;

use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use srclayoutlib::{analyze_manifest, AnalysisOptions, CancellationFlag, Manifest, TargetReport};
use tracing_subscriber::EnvFilter;

use crate::render::{render_text, Theme};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("srclayout")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Infers IDE source directories from build-target sources and detects split packages")
        .arg(
            Arg::new("manifest")
                .help("Manifest of targets to analyze")
                .default_value("srclayout.json"),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .action(ArgAction::Append)
                .help("Only print this target (can be specified multiple times)"),
        )
        .arg(
            Arg::new("extension")
                .short('e')
                .long("extension")
                .default_value(srclayoutlib::DEFAULT_EXTENSION)
                .help("Extension of source files that carry a package declaration"),
        )
        .arg(
            Arg::new("no-follow-links")
                .long("no-follow-links")
                .action(ArgAction::SetTrue)
                .help("Do not follow symbolic links while scanning"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Exit with an error if any target falls back or reports an error"),
        )
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build analysis options from matches
fn build_options(matches: &ArgMatches, cancellation: CancellationFlag) -> AnalysisOptions {
    let mut options = AnalysisOptions::new()
        .follow_links(!matches.get_flag("no-follow-links"))
        .cancellation(cancellation);
    if let Some(extension) = matches.get_one::<String>("extension") {
        options = options.extension(extension);
    }
    options
}

/// Extract targets list from matches
fn extract_targets(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("target")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn run(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let cancellation = CancellationFlag::new();
    let handler_flag = cancellation.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        tracing::warn!("Could not install Ctrl-C handler: {e}");
    }

    let manifest_path = matches
        .get_one::<String>("manifest")
        .context("missing manifest argument")?;
    let manifest = Manifest::from_path(manifest_path)?;

    let selected = extract_targets(matches);
    for name in &selected {
        if manifest.target(name).is_none() {
            bail!("Target '{name}' is not defined in '{manifest_path}'");
        }
    }

    let options = build_options(matches, cancellation);
    let outcomes = analyze_manifest(&manifest, &options)?;

    // Strict mode judges every analyzed target, printed or not
    let reports: Vec<TargetReport> = outcomes.iter().map(TargetReport::from_outcome).collect();
    let strict_failure =
        matches.get_flag("strict") && reports.iter().any(TargetReport::is_strict_failure);
    let reports: Vec<TargetReport> = reports
        .into_iter()
        .filter(|report| selected.is_empty() || selected.contains(&report.name))
        .collect();

    match matches.get_one::<String>("output").map(String::as_str) {
        Some("json") => println!("{}", serde_json::to_string_pretty(&reports)?),
        _ => print!("{}", render_text(&reports, &Theme::default())),
    }

    let failed = outcomes.iter().any(|outcome| outcome.result.is_err());

    Ok(if failed || strict_failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging();

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
