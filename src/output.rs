//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The primary display for every entity (category, project, document) is its
//! semantic identity, with paths and details shown as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 Virt (2 projects)
//!     001 Nano KVM [In Progress]
//!         Nano VMM for KVM/HV APIs.
//!     002 Nano Container [In Progress]
//!
//! Unlisted categories
//!     orphan (Nowhere)
//!
//! Status
//!     13 total, 0 done, 3 in progress, 10 planned
//! ```
//!
//! ## Diagrams
//!
//! ```text
//! til/2025/kvm-exits.md (2 diagrams)
//!     line 5: /mermaid/diagram-1718000000000-0.svg
//!     line 13: failed: Renderer failed (exit status: 1): Parse error
//!     rewritten
//!
//! Scanned 4 documents, rewrote 1, rendered 1 diagram, 1 failed
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Nano KVM → projects/nano-kvm.html
//! Data → catalogue.json
//!
//! Generated 1 index, 13 project pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalogue::{Catalogue, StatusCounts};
use crate::diagrams::{DiagramEvent, PreprocessSummary};
use crate::generate::GenerateReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 project`, `2 projects`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

/// `path` relative to `root` when it lies under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn format_counts(counts: &StatusCounts) -> String {
    format!(
        "{} total, {} done, {} in progress, {} planned",
        counts.total, counts.done, counts.in_progress, counts.planned
    )
}

// ============================================================================
// check
// ============================================================================

/// Format the grouped catalogue, unlisted projects, and status totals.
pub fn format_catalogue_output(catalogue: &Catalogue) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];

    let groups = catalogue.groups();
    for (i, group) in groups.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            group.category,
            plural(group.projects.len(), "project")
        ));
        for (j, project) in group.projects.iter().enumerate() {
            lines.push(format!(
                "{}{} {} [{}]",
                indent(1),
                format_index(j + 1),
                project.name,
                project.status.label()
            ));
            if !project.description.is_empty() {
                lines.push(format!(
                    "{}{}",
                    indent(2),
                    truncate_desc(&project.description, 60)
                ));
            }
        }
    }

    let empty: Vec<&str> = catalogue
        .categories
        .iter()
        .filter(|c| !groups.iter().any(|g| g.category == c.as_str()))
        .map(String::as_str)
        .collect();
    if !empty.is_empty() {
        lines.push(String::new());
        lines.push("Empty categories".to_string());
        for category in empty {
            lines.push(format!("{}{}", indent(1), category));
        }
    }

    let unmatched = catalogue.unmatched();
    if !unmatched.is_empty() {
        lines.push(String::new());
        lines.push("Unlisted categories".to_string());
        for project in unmatched {
            lines.push(format!("{}{} ({})", indent(1), project.id, project.category));
        }
    }

    lines.push(String::new());
    lines.push("Status".to_string());
    lines.push(format!(
        "{}{}",
        indent(1),
        format_counts(&catalogue.status_counts())
    ));
    lines
}

pub fn print_catalogue_output(catalogue: &Catalogue) {
    for line in format_catalogue_output(catalogue) {
        println!("{}", line);
    }
}

// ============================================================================
// diagrams
// ============================================================================

/// Format a single preprocessing event as display lines.
///
/// Document paths are shown relative to `root`.
pub fn format_diagram_event(event: &DiagramEvent, root: &Path) -> Vec<String> {
    match event {
        DiagramEvent::DocumentStarted { path, blocks } => vec![format!(
            "{} ({})",
            display_path(path, root),
            plural(*blocks, "diagram")
        )],
        DiagramEvent::DiagramRendered {
            line, public_path, ..
        } => vec![format!("{}line {}: {}", indent(1), line, public_path)],
        DiagramEvent::DiagramFailed { line, reason, .. } => {
            let first = reason.lines().next().unwrap_or_default();
            vec![format!("{}line {}: failed: {}", indent(1), line, first)]
        }
        DiagramEvent::DocumentRewritten { .. } => vec![format!("{}rewritten", indent(1))],
    }
}

pub fn format_preprocess_summary(summary: &PreprocessSummary) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Scanned {}, rewrote {}, rendered {}, {} failed",
            plural(summary.documents, "document"),
            summary.rewritten,
            plural(summary.rendered, "diagram"),
            summary.failed
        ),
    ]
}

pub fn print_preprocess_summary(summary: &PreprocessSummary) {
    for line in format_preprocess_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the pages written by the build.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Home \u{2192} {}", report.index));
    for (i, page) in report.detail_pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.title,
            page.path
        ));
    }
    lines.push(format!("Data \u{2192} {}", report.data));
    lines.push(String::new());
    lines.push(format!(
        "Generated 1 index, {}",
        plural(report.detail_pages.len(), "project page")
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
