//! Error types for the commit fetcher.

use reqwest::StatusCode;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Fetch error types.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The repository URL matches neither supported style.
    #[error(
        "unsupported repository URL: {url}. Expected https://dev.azure.com/{{organization}}/{{project}}/_git/{{repository}} or https://{{organization}}.visualstudio.com/{{project}}/_git/{{repository}}"
    )]
    UnsupportedUrl { url: String },

    /// The request could not be sent or the response not read.
    #[error("request for repository {repository} failed ({url}): {source}")]
    Request {
        repository: String,
        url: String,
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("repository {repository} returned HTTP {status} ({url})")]
    Status {
        repository: String,
        url: String,
        status: StatusCode,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response for repository {repository} ({url}): {source}")]
    Decode {
        repository: String,
        url: String,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Returns the repository (or URL) the error relates to.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        match self {
            Self::Client(_) => None,
            Self::UnsupportedUrl { url } => Some(url),
            Self::Request { repository, .. }
            | Self::Status { repository, .. }
            | Self::Decode { repository, .. } => Some(repository),
        }
    }
}
