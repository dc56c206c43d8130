//! Network collaborators of the deployment flows.
//!
//! Each remote service sits behind a trait so flows can run against mocks
//! in tests:
//!
//! - [`ContentClient`]: content network entity building, deployment and lookup
//! - [`BuilderApi`]: builder-hosted media and pool publishing
//! - [`AssetFetcher`]: model files referenced by a scene's asset catalog
//!
//! The traits use boxed futures so they can be held as `Arc<dyn ...>`.
//!
//! # Example
//!
//! ```ignore
//! use scenedeploy::client::{ContentClient, HttpContentClient};
//!
//! let client = HttpContentClient::new("https://peer.decentraland.org/content")?;
//! let entities = client.fetch_entities_by_pointers(vec!["0,0".into()]).await?;
//! ```

mod assets;
mod builder;
mod content;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::content::ContentError;

pub use assets::{AssetFetcher, HttpAssetFetcher};
pub use builder::{BuilderApi, HttpBuilderApi, MediaUpload};
pub use content::{ContentClient, DeployEntityRequest, HttpContentClient};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request timeout for all HTTP collaborators.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors raised by network collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Build(String),

    /// The request could not be sent or its body not read.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with a non-success status.
    ///
    /// The first line carries the server's own reason; any trace the server
    /// appended follows on later lines.
    #[error("HTTP {status} from {url}: {}", .body.trim())]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Entity construction failed before anything was sent.
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

pub(crate) fn build_http_client(timeout_secs: u64) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ClientError::Build(e.to_string()))
}

/// Joins a base URL and a path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends a request, mapping transport errors and non-success statuses.
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
    url: &str,
) -> ClientResult<reqwest::Response> {
    let response = request.send().await.map_err(|e| ClientError::Request {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a.b/content/", "/entities"), "https://a.b/content/entities");
        assert_eq!(join_url("https://a.b", "x/y"), "https://a.b/x/y");
    }

    #[test]
    fn test_status_error_first_line() {
        let err = ClientError::Status {
            status: 400,
            url: "https://a.b/entities".into(),
            body: "\nbad entity\n    at check (server.js:1)\n".into(),
        };
        let message = err.to_string();
        assert_eq!(
            message.lines().next(),
            Some("HTTP 400 from https://a.b/entities: bad entity")
        );
        assert!(message.contains("at check"));
    }
}
