use super::types::ReportDocument;
use crate::utils::config::ReportFormat;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Where rendered reports end up
pub trait ReportStore: Send + Sync {
    /// Write a rendered report and return its location
    fn persist(&self, report: &ReportDocument, format: ReportFormat, rendered: &str)
        -> Result<PathBuf>;
}

/// Writes `relatorio-<timestamp>.<ext>` files into a directory
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportStore for FsReportStore {
    fn persist(
        &self,
        report: &ReportDocument,
        format: ReportFormat,
        rendered: &str,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create report dir: {}", self.dir.display()))?;

        let path = self.dir.join(report_file_name(format));
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        log::info!(
            "Report for session {} saved to {}",
            report.session_id,
            path.display()
        );
        Ok(path)
    }
}

/// `relatorio-2026-03-01T14-05-09.json`
pub fn report_file_name(format: ReportFormat) -> String {
    format!(
        "relatorio-{}.{}",
        Utc::now().format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::ResultsAggregate;

    #[test]
    fn test_report_file_name_shape() {
        let name = report_file_name(ReportFormat::Html);
        assert!(name.starts_with("relatorio-"));
        assert!(name.ends_with(".html"));
        // relatorio- + YYYY-MM-DDTHH-MM-SS + .html
        assert_eq!(name.len(), "relatorio-".len() + 19 + ".html".len());
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_persist_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsReportStore::new(tmp.path().join("relatorios"));
        let doc = ReportDocument::build(&ResultsAggregate::new(), &[], &[], "", "");

        let path = store.persist(&doc, ReportFormat::Json, "{}").unwrap();
        assert!(path.starts_with(store.dir()));
        assert_eq!(path.extension().unwrap(), "json");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
