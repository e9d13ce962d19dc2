pub mod html;
pub mod json;
pub mod storage;
pub mod types;

use crate::utils::config::ReportFormat;
use anyhow::Result;
use types::ReportDocument;

/// Render a report in the requested format
pub fn render(report: &ReportDocument, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => json::render(report),
        ReportFormat::Html => Ok(html::render(report)),
    }
}
