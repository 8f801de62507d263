//! Output format for CLI results

use std::fmt::Write as _;

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::errors::GateError;
use crate::validator::ValidationReport;

/// Output format enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable (default)
    #[default]
    Text,

    /// Pretty-printed JSON
    Json,
}

/// Render any serializable outcome as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, GateError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render validation reports in the requested format
pub fn render_reports(
    reports: &[ValidationReport],
    format: OutputFormat,
    verbose: bool,
) -> Result<String, GateError> {
    match format {
        OutputFormat::Json => to_json(&reports),
        OutputFormat::Text => Ok(render_text(reports, verbose)),
    }
}

fn render_text(reports: &[ValidationReport], verbose: bool) -> String {
    let mut out = String::new();
    for report in reports {
        match &report.error {
            None => {
                let _ = writeln!(out, "{} {}", "✓".green(), report.file_path);
                if verbose {
                    let _ = writeln!(
                        out,
                        "  Nodes: {} | Edges: {} | Complexity: {}{}",
                        report.node_count,
                        report.edge_count,
                        report.complexity_score.unwrap_or_default(),
                        if report.is_complex { " (complex)" } else { "" }
                    );
                }
            }
            Some(error) => {
                let _ = writeln!(out, "{} {}", "✗".red(), report.file_path);
                let _ = writeln!(out, "  {}", error.message);
                if let Some(fix) = &error.fix {
                    let _ = writeln!(out, "  {} {}", "Fix:".yellow(), fix);
                }
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    if reports.len() > 1 || verbose {
        let _ = writeln!(
            out,
            "\n{} file(s), {} valid, {} invalid",
            reports.len(),
            reports.len() - invalid,
            invalid
        );
    }
    out
}
