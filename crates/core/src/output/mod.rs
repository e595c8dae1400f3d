mod json;
mod yaml;

pub use json::to_json;
pub use yaml::to_yaml;

use crate::models::RewriteReport;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Format a RewriteReport according to the specified format
pub fn format_report(report: &RewriteReport, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Summary => Ok(format_summary(report)),
    }
}

/// Generate a human-readable summary
pub fn format_summary(report: &RewriteReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Alias Rewrite Summary\n\
         =====================\n\
         Root: {}\n\n",
        report.root.display()
    ));

    for file in report.files.iter().filter(|f| f.changed) {
        output.push_str(&format!("{}\n", file.path.display()));
        for rewrite in &file.rewrites {
            output.push_str(&format!(
                "  {}:{}  {} -> {}\n",
                rewrite.line, rewrite.column, rewrite.from, rewrite.to
            ));
        }
    }
    if report.stats.files_changed > 0 {
        output.push('\n');
    }

    output.push_str(&format!(
        "Files Scanned: {}\n\
         - JavaScript: {}\n\
         - TypeScript: {}\n\
         Files Changed: {}\n\
         References Rewritten: {}\n\n",
        report.stats.total_files,
        report.stats.javascript_files,
        report.stats.typescript_files,
        report.stats.files_changed,
        report.stats.total_rewrites
    ));

    output.push_str(&format!(
        "Run Duration: {}ms ({:.2} files/sec)\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        report.metadata.duration_ms,
        report.metadata.files_per_second,
        report.metadata.timestamp,
        report.metadata.tool_version
    ));

    output
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
