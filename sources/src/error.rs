use reqwest::StatusCode;
use thiserror::Error;

/// Custom error type for the access layer, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Neither token nor refresh token were available")]
    NoCredentials,
    #[error("Error retrieving access token from refresh token: {0}")]
    TokenExchange(String),
    #[error("HTTP Error {status} in {what}: ep = {endpoint}: {body}")]
    Http {
        status: StatusCode,
        what: String,
        endpoint: String,
        body: String,
    },
    #[error("Requested columns were rejected, valid ones are: {}", columns.join(", "))]
    InvalidColumns { columns: Vec<String> },
    #[error("Decoding response from {0}")]
    Decoding(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
