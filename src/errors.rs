use thiserror::Error;

use crate::wizard::Step;

/// Failures raised while loading or querying a rate catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unknown catalog entry: {0}")]
    UnknownEntry(String),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Reasons a submission request is refused before it is scheduled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Submission is only available on the final step (currently on `{0}`)")]
    NotAtFinalStep(Step),
    #[error("Step `{0}` is incomplete")]
    StepIncomplete(Step),
    #[error("A submission is already processing")]
    AlreadyProcessing,
    #[error("This transaction has already been submitted")]
    AlreadyCompleted,
    #[error("No async runtime available to schedule the submission")]
    NoRuntime,
}

/// Configuration persistence failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
