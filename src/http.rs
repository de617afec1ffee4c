//! Shared HTTP client and fetch errors.

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} reported error {code}: {message}")]
    Service {
        url: String,
        code: i64,
        message: String,
    },
}

impl FetchError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        FetchError::Request {
            url: url.to_string(),
            source,
        }
    }
}

/// Build the client used for every request of a run.
///
/// Timeouts are set per request, since the CSV download and the boundary
/// queries use different limits.
pub fn build_client(user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .build()
        .map_err(FetchError::Client)
}

/// Fail on a non-success status, keeping a short excerpt of the body.
pub(crate) async fn check_status(url: &str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status {
        url: url.to_string(),
        status,
        body: body.chars().take(200).collect(),
    })
}
