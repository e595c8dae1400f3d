use super::FormatError;
use crate::models::RewriteReport;

/// Serialize a RewriteReport to pretty-printed JSON
pub fn to_json(report: &RewriteReport) -> Result<String, FormatError> {
    serde_json::to_string_pretty(report).map_err(FormatError::from)
}
