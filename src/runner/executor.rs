use super::events::{EventEmitter, TestEvent};
use super::session::Session;
use super::state::{Extraction, StepRecord};
use crate::error::{RunError, StepError};
use crate::parser::classify;
use crate::parser::types::{Action, ElementCheck, RawStep, Verification};
use crate::utils::config::RunConfig;
use std::time::Instant;

/// Runs one step against the session's browser.
///
/// Classification, extraction, assertion and driver failures all end up in
/// a Failure record; only a lost browser session escapes as an error.
pub struct StepExecutor<'a> {
    config: &'a RunConfig,
    emitter: &'a EventEmitter,
}

impl<'a> StepExecutor<'a> {
    pub fn new(config: &'a RunConfig, emitter: &'a EventEmitter) -> Self {
        Self { config, emitter }
    }

    /// Execute a single step and time it
    pub async fn execute(
        &self,
        session: &mut Session,
        group: &str,
        step: &RawStep,
    ) -> Result<StepRecord, RunError> {
        let sentence = step.sentence();
        let started = Instant::now();

        let outcome = match classify(sentence) {
            Ok(action) => self.perform(session, &action).await,
            Err(e) => Err(e),
        };
        let duration = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => Ok(StepRecord::success(group, sentence, duration)),
            Err(StepError::Driver(e)) if e.is_fatal() => {
                Err(RunError::SessionLost(e.to_string()))
            }
            Err(e) => {
                log::debug!("Step {:?} failed: {}", sentence, e);
                Ok(StepRecord::failure(group, sentence, duration, e.to_string()))
            }
        }
    }

    /// Dispatch a classified action to the driver
    pub async fn perform(&self, session: &mut Session, action: &Action) -> Result<(), StepError> {
        let driver = session.driver();
        match action {
            Action::Navigate { url } => driver.navigate(url).await?,
            Action::GoBack => driver.go_back().await?,
            Action::Reload => driver.reload().await?,
            Action::Wait { ms } => driver.wait(*ms).await?,
            Action::Click { target } => driver.click(target).await?,
            Action::Fill { field, value } => driver.fill(field, value).await?,
            Action::Select { field, value } => driver.select_option(field, value).await?,
            Action::Check { target } => driver.check(target).await?,
            Action::Uncheck { target } => driver.uncheck(target).await?,
            Action::KeyPress { key } => driver.press_key(key).await?,
            Action::Scroll { target: None } => driver.scroll_to_bottom().await?,
            Action::Scroll { target: Some(t) } => driver.scroll_into_view(t).await?,
            Action::Verify(verification) => self.verify(session, verification).await?,
            Action::Screenshot => {
                if self.config.capture_screenshots {
                    let reference = driver.screenshot().await?;
                    log::debug!("Screenshot saved: {}", reference);
                    session.push_screenshot(reference);
                } else {
                    log::debug!("Screenshot capture disabled, skipping");
                }
            }
            Action::CaptureLogs => {
                // Messages are collected by the driver's console subscription
                let count = session.console().len();
                log::info!("Console messages captured so far: {}", count);
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} console message(s) captured", count),
                });
            }
            Action::Extract {
                target: Some(target),
                ..
            } => {
                let text = driver.text_content(target).await?;
                log::info!("Extracted {}: {:?}", target, text);
                session.push_extraction(Extraction {
                    label: target.label.clone(),
                    text,
                });
            }
            Action::Extract {
                description,
                target: None,
            } => {
                log::info!("Extracting data: {}", description);
            }
        }
        Ok(())
    }

    async fn verify(&self, session: &Session, verification: &Verification) -> Result<(), StepError> {
        let driver = session.driver();
        match verification {
            Verification::Title { mode, expected } => {
                let title = driver.title().await?;
                if !mode.matches(&title, expected) {
                    return Err(StepError::verification(
                        format!("Title {}", mode),
                        quoted(expected),
                        quoted(&title),
                    ));
                }
            }
            Verification::Url { mode, expected } => {
                let url = driver.url().await?;
                if !mode.matches(&url, expected) {
                    return Err(StepError::verification(
                        format!("URL {}", mode),
                        quoted(expected),
                        quoted(&url),
                    ));
                }
            }
            Verification::Element { target, check } => match check {
                ElementCheck::Visible => {
                    if !driver.is_visible(target).await? {
                        return Err(StepError::verification(
                            format!("Element {}", target),
                            "visible",
                            "not visible",
                        ));
                    }
                }
                ElementCheck::Exists => {
                    if !driver.exists(target).await? {
                        return Err(StepError::verification(
                            format!("Element {}", target),
                            "to exist",
                            "not found",
                        ));
                    }
                }
                ElementCheck::ContainsText(expected) => {
                    let text = driver.text_content(target).await?;
                    if !text.contains(expected.as_str()) {
                        return Err(StepError::verification(
                            format!("Element {} text contains", target),
                            quoted(expected),
                            quoted(&text),
                        ));
                    }
                }
            },
            Verification::Log { expected } => {
                if !session.console().contains_text(expected) {
                    return Err(StepError::verification(
                        "Console log",
                        quoted(expected),
                        format!("{} message(s) without it", session.console().len()),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s)
}

