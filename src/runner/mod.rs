pub mod events;
pub mod executor;
pub mod session;
pub mod state;

use crate::error::RunError;
use crate::parser::parse_flow;
use crate::parser::types::Group;
use crate::report::storage::{FsReportStore, ReportStore};
use crate::report::types::ReportDocument;
use crate::utils::config::RunConfig;
use std::time::{Duration, Instant};

pub use events::*;
use executor::StepExecutor;
pub use session::Session;
use state::ResultsAggregate;

/// Drives a flow document through a session, step by step, and writes the
/// report when done.
pub struct TestRunner {
    config: RunConfig,
    emitter: EventEmitter,
    store: Box<dyn ReportStore>,
}

impl TestRunner {
    pub fn new(config: RunConfig) -> Self {
        let store = Box::new(FsReportStore::new(config.report_dir.clone()));
        Self {
            config,
            emitter: EventEmitter::default(),
            store,
        }
    }

    /// Replace the filesystem report store
    pub fn with_store(mut self, store: Box<dyn ReportStore>) -> Self {
        self.store = store;
        self
    }

    /// Receive progress events for the runs that follow
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every group of `flow_text` in document order.
    ///
    /// Step failures are recorded and the run goes on. With `pararNaFalha`
    /// the rest of the failing group is skipped and the next group starts.
    /// Only a lost browser session aborts the run.
    pub async fn run(
        &self,
        session: &mut Session,
        flow_text: &str,
    ) -> Result<ResultsAggregate, RunError> {
        session.begin_run()?;

        let groups = parse_flow(flow_text);
        let step_count = groups.iter().map(|g| g.steps.len()).sum();
        self.emitter.emit(TestEvent::RunStarted {
            session_id: session.id().to_string(),
            group_count: groups.len(),
            step_count,
        });
        log::info!(
            "Running {} group(s), {} step(s) in session {}",
            groups.len(),
            step_count,
            session.id()
        );

        let started = Instant::now();
        let outcome = self.run_groups(session, &groups).await;
        session.set_total_duration(started.elapsed().as_millis() as u64);

        // A lost session has nothing left to report on
        let outcome = match outcome {
            Ok(()) => self.write_report(session).await,
            Err(e) => Err(e),
        };

        if !self.config.keep_open {
            if let Err(e) = session.close().await {
                if outcome.is_ok() {
                    return Err(e);
                }
                log::warn!("Failed to close session {}: {}", session.id(), e);
            }
        }
        outcome?;

        let results = session.results().clone();
        self.emitter.emit(TestEvent::RunFinished {
            success_count: results.success_count(),
            failure_count: results.failure_count(),
            total_duration_ms: results.total_duration_ms(),
        });
        Ok(results)
    }

    /// Execute every step of every group; only a lost session stops early
    async fn run_groups(&self, session: &mut Session, groups: &[Group]) -> Result<(), RunError> {
        let executor = StepExecutor::new(&self.config, &self.emitter);

        for group in groups {
            self.emitter.emit(TestEvent::GroupStarted {
                name: group.name.clone(),
                step_count: group.steps.len(),
            });

            for (index, step) in group.steps.iter().enumerate() {
                self.emitter.emit(TestEvent::StepStarted {
                    group: group.name.clone(),
                    index,
                    description: step.sentence().to_string(),
                });

                let record = executor.execute(session, &group.name, step).await?;
                let passed = record.is_success();

                if passed {
                    self.emitter.emit(TestEvent::StepPassed {
                        group: group.name.clone(),
                        index,
                        duration_ms: record.duration_ms,
                    });
                } else {
                    self.emitter.emit(TestEvent::StepFailed {
                        group: group.name.clone(),
                        index,
                        error: record.error.clone().unwrap_or_default(),
                        duration_ms: record.duration_ms,
                    });
                }
                session.record(record);

                if !passed && self.config.stop_on_failure {
                    let remaining = group.steps.len() - index - 1;
                    if remaining > 0 {
                        self.emitter.emit(TestEvent::GroupAbandoned {
                            name: group.name.clone(),
                            remaining,
                        });
                    }
                    break;
                }

                if passed {
                    if let Some(delay) = self.config.step_delay_ms.filter(|d| *d > 0) {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }
        Ok(())
    }

    async fn write_report(&self, session: &Session) -> Result<(), RunError> {
        let driver = session.driver();
        let title = driver.title().await.unwrap_or_else(|e| {
            log::warn!("Could not read page title for report: {}", e);
            String::new()
        });
        let url = driver.url().await.unwrap_or_else(|e| {
            log::warn!("Could not read page URL for report: {}", e);
            String::new()
        });

        let logs = if self.config.capture_logs {
            session.console().snapshot()
        } else {
            Vec::new()
        };

        let report = ReportDocument::build(
            session.results(),
            &logs,
            session.screenshots(),
            &title,
            &url,
        )
        .with_session_id(session.id())
        .with_extractions(session.extractions());

        let rendered = crate::report::render(&report, self.config.report_format)?;
        let path = self
            .store
            .persist(&report, self.config.report_format, &rendered)?;

        self.emitter.emit(TestEvent::ReportSaved {
            path: path.display().to_string(),
        });
        Ok(())
    }
}
