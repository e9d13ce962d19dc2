use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Current time as an ISO-8601 string with millisecond precision
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Step execution status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Failure,
}

/// Outcome of one executed step; never modified after it is recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub group: String,
    pub description: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl StepRecord {
    pub fn success(group: &str, description: &str, duration_ms: u64) -> Self {
        Self {
            group: group.to_string(),
            description: description.to_string(),
            status: StepStatus::Success,
            duration_ms,
            error: None,
            timestamp: iso_now(),
        }
    }

    pub fn failure(group: &str, description: &str, duration_ms: u64, error: String) -> Self {
        Self {
            group: group.to_string(),
            description: description.to_string(),
            status: StepStatus::Failure,
            duration_ms,
            error: Some(error),
            timestamp: iso_now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// Append-only record of a run.
///
/// `success_count + failure_count == steps.len()` holds at all times since
/// [`ResultsAggregate::record`] is the only way in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultsAggregate {
    steps: Vec<StepRecord>,
    success_count: u32,
    failure_count: u32,
    total_duration_ms: u64,
}

impl ResultsAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: StepRecord) {
        match step.status {
            StepStatus::Success => self.success_count += 1,
            StepStatus::Failure => self.failure_count += 1,
        }
        self.steps.push(step);
    }

    pub fn set_total_duration(&mut self, duration_ms: u64) {
        self.total_duration_ms = duration_ms;
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    pub fn passed(&self) -> bool {
        self.failure_count == 0
    }
}

/// One browser console message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub time: String,
}

/// Shared console transcript; drivers push into it from their own callback
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time
    pub fn push(&self, kind: &str, text: &str) {
        let entry = LogEntry {
            kind: kind.to_string(),
            text: text.to_string(),
            time: iso_now(),
        };
        self.lock().push(entry);
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.lock().iter().any(|entry| entry.text.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panicked writer cannot leave a Vec half-pushed
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Text read by an `Extraia o texto do elemento` step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extraction {
    pub label: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_follow_records() {
        let mut results = ResultsAggregate::new();
        results.record(StepRecord::success("A", "Volte", 12));
        results.record(StepRecord::failure("A", "Clique", 3, "boom".into()));
        results.record(StepRecord::success("B", "Atualize", 7));

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(
            (results.success_count() + results.failure_count()) as usize,
            results.steps().len()
        );
        assert!(!results.passed());
    }

    #[test]
    fn test_record_serialization() {
        let record = StepRecord::failure("Geral", "Clique", 5, "not found".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["durationMs"], 5);
        assert_eq!(json["error"], "not found");

        let ok = serde_json::to_value(StepRecord::success("Geral", "Volte", 1)).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn test_console_log_is_shared_between_clones() {
        let log = ConsoleLog::new();
        let driver_side = log.clone();
        driver_side.push("log", "app ready");
        assert_eq!(log.len(), 1);
        assert!(log.contains_text("ready"));
        assert_eq!(log.snapshot()[0].kind, "log");
        log.clear();
        assert!(driver_side.is_empty());
    }
}
