use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Everything one review of one file produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub file: PathBuf,
    pub language: String,
    pub model: String,
    pub generated_at: String,
    #[serde(default)]
    pub bugs: Vec<BugFinding>,
    #[serde(default)]
    pub optimizations: Vec<Optimization>,
    #[serde(default)]
    pub summary: String,
    /// Queries that failed or came back in an unexpected shape. The
    /// review still counts as a success; these explain any gaps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One bug the model reported. Fields beyond the description are
/// whatever the model chose to fill in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugFinding {
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Write the JSON rendition of a report into `dir`, creating the
/// directory as needed. Returns the path written.
pub fn save_json_report(report: &ReviewReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let path = dir.join(report_file_name(&report.file, "json"));
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

/// Write the Markdown rendition of a report into `dir`.
pub fn save_markdown_report(report: &ReviewReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let path = dir.join(report_file_name(&report.file, "md"));
    fs::write(&path, render_markdown(report))
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

pub fn render_markdown(report: &ReviewReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Code Review: {}\n", report.file.display());
    let _ = writeln!(out, "- **Language**: {}", report.language);
    let _ = writeln!(out, "- **Model**: {}", report.model);
    let _ = writeln!(out, "- **Generated**: {}\n", report.generated_at);

    out.push_str("## Summary\n\n");
    if report.summary.is_empty() {
        out.push_str("_No summary available._\n\n");
    } else {
        let _ = writeln!(out, "{}\n", report.summary);
    }

    let _ = writeln!(out, "## Bugs ({})\n", report.bugs.len());
    if report.bugs.is_empty() {
        out.push_str("No bugs reported.\n\n");
    }
    for bug in &report.bugs {
        let severity = bug.severity.as_deref().unwrap_or("unspecified");
        let _ = write!(out, "- **[{}]**", severity);
        if let Some(line) = bug.line {
            let _ = write!(out, " line {}:", line);
        }
        let _ = writeln!(out, " {}", bug.description);
        if let Some(suggestion) = &bug.suggestion {
            let _ = writeln!(out, "  - Suggestion: {}", suggestion);
        }
    }
    if !report.bugs.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "## Optimizations ({})\n", report.optimizations.len());
    if report.optimizations.is_empty() {
        out.push_str("No optimizations reported.\n");
    }
    for opt in &report.optimizations {
        let impact = opt.impact.as_deref().unwrap_or("unspecified");
        let _ = write!(out, "- **[{}]**", impact);
        if let Some(line) = opt.line {
            let _ = write!(out, " line {}:", line);
        }
        let _ = writeln!(out, " {}", opt.description);
        if let Some(suggestion) = &opt.suggestion {
            let _ = writeln!(out, "  - Suggestion: {}", suggestion);
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\n## Warnings\n");
        for warning in &report.warnings {
            let _ = writeln!(out, "- {}", warning);
        }
    }
    out
}

/// Report file name for a reviewed path. The full path is flattened
/// into the name so same-named files in different directories cannot
/// clobber each other, and a timestamp keeps repeat runs apart.
fn report_file_name(source: &Path, extension: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_review_{}.{}", sanitize_path(source), timestamp, extension)
}

fn sanitize_path(path: &Path) -> String {
    let mut out = String::new();
    for ch in path.display().to_string().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
