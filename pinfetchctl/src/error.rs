//! Error module
//!

use thiserror::Error;

use pinfetch_sources::SourceError;

/// Everything that can go wrong between submission and the merged table.
///
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Headers of reports do not match: {0}")]
    HeaderMismatch(String),
    #[error("Reports still pending after {0} checks: {1}")]
    PollBudgetExceeded(u64, String),
    #[error("Report {0} finished without a result URL")]
    MissingUrl(String),
    #[error("No report finished successfully, nothing to merge")]
    NothingToMerge,
    #[error("Bad date bounds: {0}")]
    Dates(String),
    #[error("Downloading {0}: {1}")]
    Download(String, #[source] reqwest::Error),
    #[error(transparent)]
    Config(#[from] crate::ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
