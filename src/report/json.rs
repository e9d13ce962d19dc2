use super::types::ReportDocument;
use anyhow::Result;

/// Render the report as pretty-printed JSON
pub fn render(report: &ReportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
