//! Output formatting for config trees and validation issues.

use crate::config::render_yaml;
use crate::error::ValidationIssue;
use clap::ValueEnum;
use serde_json::Value;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Format a config tree (or one section of it).
pub fn format_tree(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Yaml => render_yaml(value),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
            out.push('\n');
            out
        }
    }
}

/// Format validation issues, one per line for YAML-style text output.
pub fn format_issues(issues: &[ValidationIssue], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(issues).unwrap_or_default();
            out.push('\n');
            out
        }
        OutputFormat::Yaml => {
            let mut out = String::new();
            for issue in issues {
                let kind = serde_json::to_value(issue.kind)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                out.push_str(&format!("- [{}] {}\n", kind, issue.message));
            }
            out
        }
    }
}
