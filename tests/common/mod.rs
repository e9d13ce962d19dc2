#![allow(dead_code)]

use async_trait::async_trait;
use fluxo_tester::driver::{BrowserDriver, DriverError, DriverResult, SelectorCandidates};
use fluxo_tester::report::storage::ReportStore;
use fluxo_tester::report::types::ReportDocument;
use fluxo_tester::runner::state::ConsoleLog;
use fluxo_tester::utils::config::ReportFormat;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the test can still see after the driver moves into a session
#[derive(Clone, Default)]
pub struct MockHandle {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<AtomicBool>,
}

impl MockHandle {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Scripted in-memory page. Every label resolves unless listed as missing.
#[derive(Default)]
pub struct MockDriver {
    title: String,
    url: Mutex<String>,
    missing: HashSet<String>,
    hidden: HashSet<String>,
    texts: HashMap<String, String>,
    lost_on: Option<String>,
    console_seed: Vec<(String, String)>,
    screenshots: AtomicUsize,
    handle: MockHandle,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_url(self, url: &str) -> Self {
        *self.url.lock().unwrap() = url.to_string();
        self
    }

    pub fn with_missing(mut self, label: &str) -> Self {
        self.missing.insert(label.to_string());
        self
    }

    pub fn with_hidden(mut self, label: &str) -> Self {
        self.hidden.insert(label.to_string());
        self
    }

    pub fn with_text(mut self, label: &str, text: &str) -> Self {
        self.texts.insert(label.to_string(), text.to_string());
        self
    }

    /// Any action on `label` reports the browser as gone
    pub fn losing_session_on(mut self, label: &str) -> Self {
        self.lost_on = Some(label.to_string());
        self
    }

    pub fn with_console(mut self, kind: &str, text: &str) -> Self {
        self.console_seed.push((kind.to_string(), text.to_string()));
        self
    }

    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }

    fn log(&self, call: String) {
        self.handle.calls.lock().unwrap().push(call);
    }

    fn resolve(&self, target: &SelectorCandidates) -> DriverResult<()> {
        if self.lost_on.as_deref() == Some(target.label.as_str()) {
            return Err(DriverError::SessionLost("Target closed".into()));
        }
        if self.missing.contains(&target.label) {
            return Err(DriverError::NotResolved(target.label.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn subscribe_console(&self, sink: ConsoleLog) -> DriverResult<()> {
        for (kind, text) in &self.console_seed {
            sink.push(kind, text);
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.log(format!("navigate {}", url));
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn go_back(&self) -> DriverResult<()> {
        self.log("go_back".into());
        Ok(())
    }

    async fn reload(&self) -> DriverResult<()> {
        self.log("reload".into());
        Ok(())
    }

    async fn wait(&self, ms: u64) -> DriverResult<()> {
        self.log(format!("wait {}", ms));
        Ok(())
    }

    async fn click(&self, target: &SelectorCandidates) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("click {}", target.label));
        Ok(())
    }

    async fn fill(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("fill {}={}", target.label, value));
        Ok(())
    }

    async fn select_option(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("select {}={}", target.label, value));
        Ok(())
    }

    async fn check(&self, target: &SelectorCandidates) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("check {}", target.label));
        Ok(())
    }

    async fn uncheck(&self, target: &SelectorCandidates) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("uncheck {}", target.label));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> DriverResult<()> {
        self.log(format!("press {}", key));
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        self.log("scroll_to_bottom".into());
        Ok(())
    }

    async fn scroll_into_view(&self, target: &SelectorCandidates) -> DriverResult<()> {
        self.resolve(target)?;
        self.log(format!("scroll_into_view {}", target.label));
        Ok(())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(self.title.clone())
    }

    async fn url(&self) -> DriverResult<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn is_visible(&self, target: &SelectorCandidates) -> DriverResult<bool> {
        Ok(self.resolve(target).is_ok() && !self.hidden.contains(&target.label))
    }

    async fn exists(&self, target: &SelectorCandidates) -> DriverResult<bool> {
        Ok(self.resolve(target).is_ok())
    }

    async fn text_content(&self, target: &SelectorCandidates) -> DriverResult<String> {
        self.resolve(target)?;
        Ok(self.texts.get(&target.label).cloned().unwrap_or_default())
    }

    async fn screenshot(&self) -> DriverResult<String> {
        let n = self.screenshots.fetch_add(1, Ordering::SeqCst);
        self.log("screenshot".into());
        Ok(format!("screenshots/screenshot_{}.png", n))
    }

    async fn close(&self) -> DriverResult<()> {
        self.log("close".into());
        self.handle.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Keeps rendered reports in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub saved: Arc<Mutex<Vec<(ReportFormat, String)>>>,
}

impl MemoryStore {
    pub fn last(&self) -> Option<(ReportFormat, String)> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl ReportStore for MemoryStore {
    fn persist(
        &self,
        _report: &ReportDocument,
        format: ReportFormat,
        rendered: &str,
    ) -> anyhow::Result<PathBuf> {
        let mut saved = self.saved.lock().unwrap();
        saved.push((format, rendered.to_string()));
        Ok(PathBuf::from(format!("memory/{}.{}", saved.len(), format.extension())))
    }
}

/// Store whose writes always fail
pub struct FailingStore;

impl ReportStore for FailingStore {
    fn persist(
        &self,
        _report: &ReportDocument,
        _format: ReportFormat,
        _rendered: &str,
    ) -> anyhow::Result<PathBuf> {
        anyhow::bail!("disk full")
    }
}
