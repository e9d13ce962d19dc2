use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Serialized form of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            _ => anyhow::bail!("Unknown report format: {}", s),
        }
    }
}

/// Run options. Field names on disk are the ones flow authors already use
/// (`tempoEspera`, `pararNaFalha`, `manterAberto`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Take screenshots on `Capture screenshot` steps
    pub capture_screenshots: bool,

    /// Include the console transcript in the report
    pub capture_logs: bool,

    pub report_format: ReportFormat,

    /// Directory reports are written to
    pub report_dir: PathBuf,

    /// Delay after each successful step (ms)
    #[serde(rename = "tempoEspera", alias = "stepDelayMs")]
    pub step_delay_ms: Option<u64>,

    /// Abandon the rest of a group after a failed step
    #[serde(rename = "pararNaFalha", alias = "stopOnFailure")]
    pub stop_on_failure: bool,

    /// Leave the browser open after the run
    #[serde(rename = "manterAberto", alias = "keepOpen")]
    pub keep_open: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            capture_screenshots: true,
            capture_logs: true,
            report_format: ReportFormat::Json,
            report_dir: PathBuf::from("relatorios"),
            step_delay_ms: None,
            stop_on_failure: false,
            keep_open: false,
        }
    }
}

impl RunConfig {
    /// Load options from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_str_content(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// YAML is a superset of JSON, so one parser covers both
    pub fn from_str_content(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portuguese_option_names() {
        let json = r#"{
            "captureScreenshots": true,
            "captureLogs": false,
            "reportFormat": "html",
            "reportDir": "./relatorios-investimentos",
            "tempoEspera": 500,
            "pararNaFalha": true
        }"#;
        let config = RunConfig::from_str_content(json).unwrap();
        assert!(!config.capture_logs);
        assert_eq!(config.report_format, ReportFormat::Html);
        assert_eq!(config.report_dir, PathBuf::from("./relatorios-investimentos"));
        assert_eq!(config.step_delay_ms, Some(500));
        assert!(config.stop_on_failure);
        assert!(!config.keep_open);
    }

    #[test]
    fn test_defaults_and_yaml() {
        let config = RunConfig::from_str_content("manterAberto: true\n").unwrap();
        assert!(config.keep_open);
        assert!(config.capture_screenshots);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.report_dir, PathBuf::from("relatorios"));

        assert_eq!(RunConfig::from_str_content("  ").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Json.extension(), "json");
    }
}
