use crate::runner::state::{iso_now, Extraction, LogEntry, ResultsAggregate, StepRecord};
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "Sucesso";
pub const STATUS_FAILURE: &str = "Falha";

/// Read-only snapshot of a finished run, ready to serialize
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub session_id: String,
    pub timestamp: String,
    pub title: String,
    pub url: String,
    pub duration_ms: u64,
    pub status: String,
    pub success_count: u32,
    pub failure_count: u32,
    pub steps: Vec<StepRecord>,
    pub logs: Vec<LogEntry>,
    pub screenshots: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extractions: Vec<Extraction>,
}

impl ReportDocument {
    /// Combine a results aggregate with what the session captured
    pub fn build(
        results: &ResultsAggregate,
        logs: &[LogEntry],
        screenshots: &[String],
        page_title: &str,
        page_url: &str,
    ) -> Self {
        let status = if results.failure_count() == 0 {
            STATUS_SUCCESS
        } else {
            STATUS_FAILURE
        };

        Self {
            session_id: String::new(),
            timestamp: iso_now(),
            title: page_title.to_string(),
            url: page_url.to_string(),
            duration_ms: results.total_duration_ms(),
            status: status.to_string(),
            success_count: results.success_count(),
            failure_count: results.failure_count(),
            steps: results.steps().to_vec(),
            logs: logs.to_vec(),
            screenshots: screenshots.to_vec(),
            extractions: Vec::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn with_extractions(mut self, extractions: &[Extraction]) -> Self {
        self.extractions = extractions.to_vec();
        self
    }

    pub fn passed(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
