use super::FormatError;
use crate::models::RewriteReport;

/// Serialize a RewriteReport to YAML
pub fn to_yaml(report: &RewriteReport) -> Result<String, FormatError> {
    serde_yaml::to_string(report).map_err(FormatError::from)
}
