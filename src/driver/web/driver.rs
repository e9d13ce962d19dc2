//! Browser driver backed by Playwright
//!
//! Each step receives an ordered list of selector candidates; the driver
//! tries them in order and acts on the first one that matches an element.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use playwright::api::{page, Browser, BrowserContext, ElementHandle, Page, Viewport};
use playwright::Playwright;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::traits::{BrowserDriver, DriverError, DriverResult, Locator, SelectorCandidates};
use crate::runner::state::ConsoleLog;

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" | "safari" => Ok(BrowserType::Webkit),
            _ => anyhow::bail!("Unknown browser: {}", s),
        }
    }
}

/// Web Driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Where `Capture screenshot` images are written
    pub screenshot_dir: PathBuf,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        let headless = std::env::var("FLUXO_HEADLESS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            browser_type: BrowserType::Chromium,
            headless,
            viewport_width: 1280,
            viewport_height: 720,
            screenshot_dir: PathBuf::from("screenshots"),
        }
    }
}

/// Web Driver using Playwright
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    config: WebDriverConfig,
    screenshot_counter: AtomicUsize,
}

impl WebDriver {
    /// Launch a browser and open a blank page
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser_type = match config.browser_type {
            BrowserType::Chromium => playwright.chromium(),
            BrowserType::Firefox => playwright.firefox(),
            BrowserType::Webkit => playwright.webkit(),
        };

        let env_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
            .ok()
            .map(PathBuf::from);
        let mut launcher = browser_type.launcher().headless(config.headless);
        if config.browser_type == BrowserType::Chromium {
            if let Some(ref path) = env_path {
                log::info!("Using browser from env: {}", path.display());
                launcher = launcher.executable(path);
            }
        }
        let browser = launcher
            .launch()
            .await
            .with_context(|| format!("Failed to launch {:?}", config.browser_type))?;

        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        log::info!(
            "Launched {:?} (headless: {})",
            config.browser_type,
            config.headless
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            config,
            screenshot_counter: AtomicUsize::new(0),
        })
    }

    /// Try each candidate in order, returning the first that matches
    async fn resolve(
        &self,
        page: &Page,
        target: &SelectorCandidates,
    ) -> DriverResult<Option<(String, ElementHandle)>> {
        for locator in target.iter() {
            let sel = locator_to_playwright(locator);
            if let Some(handle) = page.query_selector(&sel).await? {
                log::debug!("Resolved {} via {}", target, sel);
                return Ok(Some((sel, handle)));
            }
        }
        Ok(None)
    }

    /// Like [`WebDriver::resolve`] but a miss is an error
    async fn resolve_selector(&self, page: &Page, target: &SelectorCandidates) -> DriverResult<String> {
        match self.resolve(page, target).await? {
            Some((sel, _)) => Ok(sel),
            None => Err(DriverError::NotResolved(target.label.clone())),
        }
    }
}

/// Convert a locator into a Playwright selector string
fn locator_to_playwright(locator: &Locator) -> String {
    match locator {
        Locator::Text(text) => format!("text=\"{}\"", escape(text)),
        Locator::Placeholder(text) => format!("[placeholder=\"{}\"]", escape(text)),
        Locator::AriaLabel(text) => format!("[aria-label=\"{}\"]", escape(text)),
        Locator::Name(text) => format!("[name=\"{}\"]", escape(text)),
        Locator::Id(id) => format!("[id=\"{}\"]", escape(id)),
        Locator::LabelledControl { label, control } => {
            format!("label:has-text(\"{}\") + {}", escape(label), control)
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl From<playwright::Error> for DriverError {
    fn from(err: playwright::Error) -> Self {
        let message = err.to_string();
        if message.to_lowercase().contains("closed") {
            DriverError::SessionLost(message)
        } else {
            DriverError::Action(message)
        }
    }
}

impl From<Arc<playwright::Error>> for DriverError {
    fn from(err: Arc<playwright::Error>) -> Self {
        let message = err.to_string();
        if message.to_lowercase().contains("closed") {
            DriverError::SessionLost(message)
        } else {
            DriverError::Action(message)
        }
    }
}

#[async_trait]
impl BrowserDriver for WebDriver {
    fn name(&self) -> &str {
        match self.config.browser_type {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }

    async fn subscribe_console(&self, sink: ConsoleLog) -> DriverResult<()> {
        let page = self.page.lock().await;
        let mut events = Box::pin(page.subscribe_event()?);

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    Ok(page::Event::Console(msg)) => {
                        let kind = msg.r#type().unwrap_or_default();
                        let text = msg.text().unwrap_or_default();
                        sink.push(&kind, &text);
                    }
                    Ok(page::Event::Close) => break,
                    Ok(_) => {}
                    Err(e) => log::debug!("Console event stream lagged: {}", e),
                }
            }
        });
        Ok(())
    }

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let page = self.page.lock().await;
        page.goto_builder(url).goto().await?;
        Ok(())
    }

    async fn go_back(&self) -> DriverResult<()> {
        let page = self.page.lock().await;
        page.evaluate::<(), ()>("() => window.history.back()", ()).await?;
        Ok(())
    }

    async fn reload(&self) -> DriverResult<()> {
        let page = self.page.lock().await;
        page.reload_builder().reload().await?;
        Ok(())
    }

    async fn wait(&self, ms: u64) -> DriverResult<()> {
        tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
        Ok(())
    }

    async fn click(&self, target: &SelectorCandidates) -> DriverResult<()> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        page.click_builder(&sel).click().await?;
        Ok(())
    }

    async fn fill(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        page.fill_builder(&sel, value).fill().await?;
        Ok(())
    }

    async fn select_option(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        match page
            .select_option_builder(&sel)
            .add_value(value.to_string())
            .select_option()
            .await
        {
            Ok(_) => Ok(()),
            Err(_) => {
                // Fall back to matching the visible option text
                page.select_option_builder(&sel)
                    .add_label(value.to_string())
                    .select_option()
                    .await?;
                Ok(())
            }
        }
    }

    async fn check(&self, target: &SelectorCandidates) -> DriverResult<()> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        page.check_builder(&sel).check().await?;
        Ok(())
    }

    async fn uncheck(&self, target: &SelectorCandidates) -> DriverResult<()> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        page.uncheck_builder(&sel).uncheck().await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> DriverResult<()> {
        let page = self.page.lock().await;
        page.keyboard.down(key).await?;
        page.keyboard.up(key).await?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        let page = self.page.lock().await;
        page.evaluate::<(), ()>(
            "() => window.scrollTo(0, document.body.scrollHeight)",
            (),
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, target: &SelectorCandidates) -> DriverResult<()> {
        let page = self.page.lock().await;
        match self.resolve(&page, target).await? {
            Some((_, handle)) => {
                handle.scroll_into_view_if_needed(None).await?;
                Ok(())
            }
            None => Err(DriverError::NotResolved(target.label.clone())),
        }
    }

    async fn title(&self) -> DriverResult<String> {
        let page = self.page.lock().await;
        Ok(page.title().await?)
    }

    async fn url(&self) -> DriverResult<String> {
        let page = self.page.lock().await;
        Ok(page.url()?)
    }

    async fn is_visible(&self, target: &SelectorCandidates) -> DriverResult<bool> {
        let page = self.page.lock().await;
        match self.resolve(&page, target).await? {
            Some((_, handle)) => Ok(handle.is_visible().await?),
            None => Ok(false),
        }
    }

    async fn exists(&self, target: &SelectorCandidates) -> DriverResult<bool> {
        let page = self.page.lock().await;
        Ok(self.resolve(&page, target).await?.is_some())
    }

    async fn text_content(&self, target: &SelectorCandidates) -> DriverResult<String> {
        let page = self.page.lock().await;
        let sel = self.resolve_selector(&page, target).await?;
        let js = "el => el.value || el.innerText || el.textContent || ''";
        let text = page
            .evaluate_on_selector::<String, _>(&sel, js, None::<String>)
            .await?;
        Ok(text)
    }

    async fn screenshot(&self) -> DriverResult<String> {
        let page = self.page.lock().await;
        std::fs::create_dir_all(&self.config.screenshot_dir)
            .with_context(|| {
                format!(
                    "Failed to create screenshot dir: {}",
                    self.config.screenshot_dir.display()
                )
            })?;

        let n = self.screenshot_counter.fetch_add(1, Ordering::SeqCst);
        let path = self.config.screenshot_dir.join(format!("screenshot_{}.png", n));
        page.screenshot_builder()
            .path(path.clone())
            .full_page(true)
            .screenshot()
            .await?;
        Ok(path.display().to_string())
    }

    async fn close(&self) -> DriverResult<()> {
        self.browser.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::selector::{synthesize, synthesize_field};

    #[test]
    fn test_locator_to_playwright() {
        let candidates = synthesize("Enviar pedido");
        let selectors: Vec<String> = candidates.iter().map(locator_to_playwright).collect();
        assert_eq!(
            selectors,
            vec![
                "text=\"Enviar pedido\"",
                "[placeholder=\"Enviar pedido\"]",
                "[aria-label=\"Enviar pedido\"]",
                "[name=\"Enviar pedido\"]",
                "[id=\"enviar-pedido\"]",
            ]
        );
    }

    #[test]
    fn test_labelled_control_selector() {
        let candidates = synthesize_field("E-mail");
        let last = candidates.iter().last().map(locator_to_playwright).unwrap();
        assert_eq!(last, "label:has-text(\"E-mail\") + textarea");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let sel = locator_to_playwright(&Locator::Text("Diga \"oi\"".into()));
        assert_eq!(sel, r#"text="Diga \"oi\"""#);
    }

    #[test]
    fn test_browser_type_from_str() {
        assert_eq!("Firefox".parse::<BrowserType>().unwrap(), BrowserType::Firefox);
        assert_eq!("chrome".parse::<BrowserType>().unwrap(), BrowserType::Chromium);
        assert!("lynx".parse::<BrowserType>().is_err());
    }
}
