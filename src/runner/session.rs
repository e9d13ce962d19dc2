use super::state::{ConsoleLog, Extraction, ResultsAggregate, StepRecord};
use crate::driver::traits::BrowserDriver;
use crate::error::RunError;
use crate::parser::types::DEFAULT_GROUP;
use std::time::Instant;
use uuid::Uuid;

/// Everything one logical test session owns: the browser, its console
/// transcript, captured screenshots and the results aggregate.
///
/// A session holds at most one run. Call [`Session::reset`] before running
/// another flow on the same browser, and [`Session::close`] when done.
pub struct Session {
    id: String,
    driver: Box<dyn BrowserDriver>,
    console: ConsoleLog,
    screenshots: Vec<String>,
    extractions: Vec<Extraction>,
    results: ResultsAggregate,
    used: bool,
    closed: bool,
}

impl Session {
    /// Wrap a driver and start capturing its console messages
    pub async fn new(driver: Box<dyn BrowserDriver>) -> Self {
        let console = ConsoleLog::new();
        if let Err(e) = driver.subscribe_console(console.clone()).await {
            log::warn!("Console capture unavailable on {}: {}", driver.name(), e);
        }

        Self {
            id: Uuid::new_v4().to_string(),
            driver,
            console,
            screenshots: Vec::new(),
            extractions: Vec::new(),
            results: ResultsAggregate::new(),
            used: false,
            closed: false,
        }
    }

    /// Load the initial page and record it as the first step
    pub async fn start(&mut self, url: &str) -> Result<(), RunError> {
        self.ensure_open()?;
        log::info!("Starting session {} at {}", self.id, url);

        let description = format!("Navegou para {}", url);
        let started = Instant::now();
        let outcome = self.driver.navigate(url).await;
        let duration = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                self.results
                    .record(StepRecord::success(DEFAULT_GROUP, &description, duration));
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(RunError::SessionLost(e.to_string())),
            Err(e) => {
                self.results.record(StepRecord::failure(
                    DEFAULT_GROUP,
                    &description,
                    duration,
                    e.to_string(),
                ));
                Ok(())
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn screenshots(&self) -> &[String] {
        &self.screenshots
    }

    pub fn extractions(&self) -> &[Extraction] {
        &self.extractions
    }

    pub fn results(&self) -> &ResultsAggregate {
        &self.results
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn push_screenshot(&mut self, reference: String) {
        self.screenshots.push(reference);
    }

    pub(crate) fn push_extraction(&mut self, extraction: Extraction) {
        self.extractions.push(extraction);
    }

    pub(crate) fn record(&mut self, step: StepRecord) {
        self.results.record(step);
    }

    pub(crate) fn set_total_duration(&mut self, duration_ms: u64) {
        self.results.set_total_duration(duration_ms);
    }

    /// Claim the session for a run
    pub(crate) fn begin_run(&mut self) -> Result<(), RunError> {
        self.ensure_open()?;
        if self.used {
            return Err(RunError::SessionAlreadyUsed);
        }
        self.used = true;
        Ok(())
    }

    /// Drop accumulated results, logs, screenshots and extractions so the
    /// session can run another flow. The browser stays where it is.
    pub fn reset(&mut self) {
        self.console.clear();
        self.screenshots.clear();
        self.extractions.clear();
        self.results = ResultsAggregate::new();
        self.used = false;
    }

    /// Close the browser; later runs fail with [`RunError::SessionClosed`]
    pub async fn close(&mut self) -> Result<(), RunError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        log::info!("Closing session {}", self.id);
        self.driver
            .close()
            .await
            .map_err(|e| RunError::SessionLost(e.to_string()))
    }

    fn ensure_open(&self) -> Result<(), RunError> {
        if self.closed {
            Err(RunError::SessionClosed)
        } else {
            Ok(())
        }
    }
}
