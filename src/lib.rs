pub mod driver;
pub mod error;
pub mod parser;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use driver::traits::BrowserDriver;
pub use error::{RunError, StepError};
pub use parser::{classify, parse_flow};
pub use runner::{session::Session, TestRunner};
pub use utils::config::RunConfig;
