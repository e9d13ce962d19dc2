use crate::runner::state::ConsoleLog;
use async_trait::async_trait;
use std::fmt;

/// One strategy for locating an element from a human label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Exact visible text
    Text(String),
    /// `placeholder` attribute
    Placeholder(String),
    /// `aria-label` attribute
    AriaLabel(String),
    /// `name` attribute
    Name(String),
    /// Element id (already slugified)
    Id(String),
    /// Form control placed right after a `<label>` with this text.
    /// `control` is the tag name: input, select or textarea.
    LabelledControl { label: String, control: String },
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Text(t) => write!(f, "text={:?}", t),
            Locator::Placeholder(p) => write!(f, "[placeholder={:?}]", p),
            Locator::AriaLabel(a) => write!(f, "[aria-label={:?}]", a),
            Locator::Name(n) => write!(f, "[name={:?}]", n),
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::LabelledControl { label, control } => {
                write!(f, "label:has-text({:?}) + {}", label, control)
            }
        }
    }
}

/// Ordered candidate list for one human label.
///
/// Drivers try the candidates in order and act on the first one that
/// resolves; they fail only when none does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCandidates {
    pub label: String,
    pub candidates: Vec<Locator>,
}

impl SelectorCandidates {
    pub fn first(&self) -> Option<&Locator> {
        self.candidates.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Display for SelectorCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.label)
    }
}

/// Failure reported by a browser driver
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Element \"{0}\" not found with any selector strategy")]
    NotResolved(String),

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("{0}")]
    Action(String),
}

impl DriverError {
    /// A lost session cannot be recovered by running the next step
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::SessionLost(_))
    }
}

impl From<anyhow::Error> for DriverError {
    fn from(err: anyhow::Error) -> Self {
        DriverError::Action(format!("{:#}", err))
    }
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Browser automation provider the interpreter delegates page work to.
///
/// Every call is a suspension point; the runner never issues two calls
/// concurrently against the same driver.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Get the driver name (e.g., "chromium", "mock")
    fn name(&self) -> &str;

    /// Start forwarding page console messages into `sink`
    async fn subscribe_console(&self, sink: ConsoleLog) -> DriverResult<()>;

    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn go_back(&self) -> DriverResult<()>;

    async fn reload(&self) -> DriverResult<()>;

    /// Pause for `ms` milliseconds
    async fn wait(&self, ms: u64) -> DriverResult<()>;

    async fn click(&self, target: &SelectorCandidates) -> DriverResult<()>;

    async fn fill(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()>;

    async fn select_option(&self, target: &SelectorCandidates, value: &str) -> DriverResult<()>;

    async fn check(&self, target: &SelectorCandidates) -> DriverResult<()>;

    async fn uncheck(&self, target: &SelectorCandidates) -> DriverResult<()>;

    /// Press a keyboard key by name (e.g. "Enter", "Tab")
    async fn press_key(&self, key: &str) -> DriverResult<()>;

    async fn scroll_to_bottom(&self) -> DriverResult<()>;

    async fn scroll_into_view(&self, target: &SelectorCandidates) -> DriverResult<()>;

    async fn title(&self) -> DriverResult<String>;

    async fn url(&self) -> DriverResult<String>;

    /// Check if an element is currently visible; `Ok(false)` when no candidate resolves
    async fn is_visible(&self, target: &SelectorCandidates) -> DriverResult<bool>;

    /// Check if any candidate resolves to an element
    async fn exists(&self, target: &SelectorCandidates) -> DriverResult<bool>;

    /// Get the text content of the first resolving element
    async fn text_content(&self, target: &SelectorCandidates) -> DriverResult<String>;

    /// Capture the page and return an opaque reference to the image
    async fn screenshot(&self) -> DriverResult<String>;

    /// Release the browser
    async fn close(&self) -> DriverResult<()>;
}
