pub mod selector;
pub mod traits;
pub mod web;

pub use traits::{BrowserDriver, DriverError, DriverResult, Locator, SelectorCandidates};
