use crate::driver::traits::DriverError;

/// Why a single step failed. Every variant is turned into a Failure record
/// by the step executor; none of them stops the run on its own.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("Could not extract arguments from command: {0}")]
    PatternExtraction(String),

    #[error("{subject}: expected {expected}, got {actual}")]
    VerificationFailed {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl StepError {
    pub fn verification(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        StepError::VerificationFailed {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Errors that abort a whole run rather than a single step.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("Session already holds the results of a previous run; call reset() first")]
    SessionAlreadyUsed,

    #[error("Session is closed")]
    SessionClosed,

    #[error("Report error: {0}")]
    Report(#[from] anyhow::Error),
}
