//! Error types for content fetching, page assembly and signup forwarding.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by a content client.
#[derive(Debug, Error)]
pub enum ContentError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Content API answered with a non-success status.
    #[error("Content API returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Requested object or type does not exist.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but did not have the expected shape.
    #[error("Malformed content response: {0}")]
    Malformed(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while running a page's fetch set.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Two fetches in one page share a name.
    #[error("Duplicate fetch name: {0}")]
    DuplicateName(String),

    /// One of the fetches failed.
    #[error("Fetch '{name}' failed: {source}")]
    Fetch {
        name: String,
        #[source]
        source: ContentError,
    },

    /// The task running a fetch panicked or was aborted.
    #[error("Fetch task '{name}' did not complete: {source}")]
    Join {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Errors raised while deriving a view model from fetched content.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Missing fetch result: {0}")]
    MissingEntry(String),

    #[error("Fetch result '{name}' is not {expected}")]
    WrongShape {
        name: String,
        expected: &'static str,
    },

    #[error("Missing field '{field}' in {record}")]
    MissingField {
        record: String,
        field: &'static str,
    },
}

/// Errors raised by the mail provider client.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail provider rejected the request with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Mail provider not configured: {0}")]
    NotConfigured(&'static str),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Anything that prevents a page from being rendered.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),

    #[error("Not Found")]
    NotFound,
}

impl PageError {
    /// HTTP status reported to the client for this error
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
