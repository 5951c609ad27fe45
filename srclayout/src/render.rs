//! Text rendering for CLI output

use console::Style;
use srclayoutlib::{DirectoryKind, DirectoryReport, LayoutState, Severity, TargetReport};
use std::fmt::Write;

/// Styles used by the text renderer
pub struct Theme {
    target: Style,
    ok: Style,
    fallback: Style,
    failed: Style,
    directory: Style,
    dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            target: Style::new().bold(),
            ok: Style::new().green(),
            fallback: Style::new().yellow(),
            failed: Style::new().red().bold(),
            directory: Style::new().cyan(),
            dim: Style::new().dim(),
        }
    }
}

/// Render reports as a human-readable summary, one block per target
pub fn render_text(reports: &[TargetReport], theme: &Theme) -> String {
    let mut out = String::new();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_target(&mut out, report, theme);
    }
    out
}

fn render_target(out: &mut String, report: &TargetReport, theme: &Theme) {
    let state = match report.state {
        LayoutState::Consistent => theme.ok.apply_to("consistent"),
        LayoutState::Fallback => theme.fallback.apply_to("fallback"),
        LayoutState::Failed => theme.failed.apply_to("failed"),
    };
    let _ = writeln!(
        out,
        "{} [{}] {}",
        theme.target.apply_to(&report.name),
        state,
        theme.dim.apply_to(&report.base)
    );

    if let Some(error) = &report.error {
        let _ = writeln!(out, "  {} {}", theme.failed.apply_to("error:"), error);
    }

    if !report.source_directories.is_empty() {
        let _ = writeln!(out, "  Source directories:");
        for directory in &report.source_directories {
            render_directory(out, directory, theme);
        }
    }

    if !report.files_without_common_root.is_empty() {
        let _ = writeln!(
            out,
            "  Files without common root ({}):",
            report.files_without_common_root.len()
        );
        for file in &report.files_without_common_root {
            let _ = writeln!(out, "    {file}");
        }
    }

    if !report.split_roots.is_empty() {
        let _ = writeln!(out, "  Split roots: {}", report.split_roots.join(", "));
    }

    for diagnostic in &report.diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => theme.fallback.apply_to("warning:"),
            Severity::Error => theme.failed.apply_to("error:"),
        };
        let _ = writeln!(out, "  {} {}", label, diagnostic.message);
    }
}

fn render_directory(out: &mut String, directory: &DirectoryReport, theme: &Theme) {
    let path = if directory.path.is_empty() {
        "."
    } else {
        directory.path.as_str()
    };
    let detail = match directory.kind {
        DirectoryKind::Files => {
            let packages = if directory.packages.is_empty() {
                String::new()
            } else {
                format!(", packages: {}", directory.packages.join(" "))
            };
            format!("{} files{}", directory.files.len(), packages)
        }
        DirectoryKind::Glob => {
            let mut detail = String::from("glob");
            if let Some(include) = &directory.include {
                let _ = write!(detail, ", include: {}", include.join(" "));
            }
            if let Some(exclude) = &directory.exclude {
                let _ = write!(detail, ", exclude: {}", exclude.join(" "));
            }
            detail
        }
    };
    let _ = writeln!(
        out,
        "    {} {}",
        theme.directory.apply_to(path),
        theme.dim.apply_to(format!("({detail})"))
    );
}
