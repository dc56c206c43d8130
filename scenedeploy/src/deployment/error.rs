use std::fmt;

use thiserror::Error;

use crate::client::ClientError;
use crate::content::ContentError;
use crate::media::MediaError;
use crate::migration::MigrationError;
use crate::packager::PackageError;

/// Errors that can abort a deployment flow.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No such project, or no project open.
    #[error("Unable to Publish: Invalid project")]
    InvalidProject,

    /// The requested project is not the one open in the editor.
    #[error("Unable to Publish: Not current project")]
    NotCurrentProject,

    /// The project has no scene.
    #[error("Unable to Publish: Invalid scene")]
    InvalidScene,

    /// No signing identity is available.
    #[error("Unable to Publish: Invalid identity")]
    InvalidIdentity,

    /// The deployment to clear is unknown.
    #[error("Unable to Publish: Invalid deployment")]
    InvalidDeployment,

    /// The renderer did not produce all five preview images.
    #[error("Failed to capture scene preview")]
    CaptureFailed,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Result type for deployment flows.
pub type DeployResult<T> = Result<T, DeploymentFailure>;

/// What a failed flow was acting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKey {
    Project(String),
    Deployment(String),
    Coords(Vec<String>),
    Worlds(Vec<String>),
}

impl fmt::Display for FailureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKey::Project(id) => write!(f, "project {}", id),
            FailureKey::Deployment(id) => write!(f, "deployment {}", id),
            FailureKey::Coords(coords) => write!(f, "coords [{}]", coords.join(" ")),
            FailureKey::Worlds(worlds) => write!(f, "worlds [{}]", worlds.join(", ")),
        }
    }
}

/// A flow failure, tagged with what the flow was acting on.
///
/// Displays as the first line of the underlying error.
#[derive(Debug)]
pub struct DeploymentFailure {
    pub key: FailureKey,
    pub error: DeployError,
}

impl fmt::Display for DeploymentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(first_line(&self.error.to_string()))
    }
}

impl std::error::Error for DeploymentFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl DeploymentFailure {
    pub fn new(key: FailureKey, error: impl Into<DeployError>) -> Self {
        Self {
            key,
            error: error.into(),
        }
    }

    /// First line of the underlying error message.
    pub fn message(&self) -> String {
        first_line(&self.error.to_string()).to_string()
    }
}

/// Text up to the first line break.
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
