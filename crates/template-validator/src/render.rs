//! Presentation of validation results
//!
//! Rendering is the only fallible step after validation: JSON serialization
//! may fail, everything before it returns data.

use crate::validation::result::{ValidationError, ValidationResult};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Presentation-only flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentationOptions {
    pub format: OutputFormat,

    /// Show "did you mean" suggestions in text output
    pub suggestions: bool,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to serialize validation result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render one result in the requested format
pub fn render(result: &ValidationResult, options: &PresentationOptions) -> Result<String, RenderError> {
    match options.format {
        OutputFormat::Text => Ok(render_text(result, options)),
        OutputFormat::Json => render_json(result),
    }
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render_issue(out: &mut String, label: colored::ColoredString, issue: &ValidationError, suggestions: bool) {
    out.push_str(&format!("  {} {} {}\n", label, issue.kind.as_str().dimmed(), issue.message));
    if let Some(location) = &issue.location {
        out.push_str(&format!("      {} {}\n", "at".dimmed(), location));
    }
    if suggestions {
        if let Some(suggestion) = &issue.suggestion {
            out.push_str(&format!("      {} {}\n", "hint:".cyan(), suggestion));
        }
    }
}

/// Human-readable report
pub fn render_text(result: &ValidationResult, options: &PresentationOptions) -> String {
    let mut out = String::new();

    for error in &result.errors {
        render_issue(&mut out, "error".red().bold(), error, options.suggestions);
    }
    for warning in &result.warnings {
        render_issue(&mut out, "warning".yellow().bold(), warning, options.suggestions);
    }

    let summary = format!(
        "{} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    );
    if result.valid {
        out.push_str(&format!("{} {}\n", "Valid".green().bold(), summary));
    } else {
        out.push_str(&format!("{} {}\n", "Invalid".red().bold(), summary));
    }
    out
}

/// Result of one manifest in a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry<'a> {
    pub path: String,
    #[serde(flatten)]
    pub result: &'a ValidationResult,
}

/// Render a batch of results, one section per manifest
pub fn render_batch(
    results: &[(PathBuf, ValidationResult)],
    options: &PresentationOptions,
) -> Result<String, RenderError> {
    match options.format {
        OutputFormat::Json => {
            let entries: Vec<BatchEntry<'_>> = results
                .iter()
                .map(|(path, result)| BatchEntry {
                    path: path.display().to_string(),
                    result,
                })
                .collect();
            render_json(&entries)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for (path, result) in results {
                out.push_str(&format!("{} {}\n", "->".blue(), path.display()));
                out.push_str(&render_text(result, options));
                out.push('\n');
            }
            let failed = results.iter().filter(|(_, r)| !r.valid).count();
            out.push_str(&format!(
                "{} {} manifest(s), {} invalid\n",
                "Checked".bold(),
                results.len(),
                failed
            ));
            Ok(out)
        }
    }
}
