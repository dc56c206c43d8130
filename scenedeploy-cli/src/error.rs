//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use scenedeploy::client::ClientError;
use scenedeploy::config::ConfigError;
use scenedeploy::deployment::DeploymentFailure;
use scenedeploy::identity::IdentityError;
use scenedeploy::migration::MigrationError;
use scenedeploy::packager::PackageError;

/// Errors surfaced to the user. Every variant exits non-zero.
#[derive(Debug)]
pub enum CliError {
    Config(String),
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Identity(IdentityError),
    Client(ClientError),
    Migration(MigrationError),
    Package(PackageError),
    Deploy(DeploymentFailure),
    Logging(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CliError::Json {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Json { path, source } => {
                write!(f, "Invalid JSON in {}: {}", path.display(), source)
            }
            CliError::Identity(e) => write!(f, "Identity error: {}", e),
            CliError::Client(e) => write!(f, "{}", e),
            CliError::Migration(e) => write!(f, "Migration failed: {}", e),
            CliError::Package(e) => write!(f, "Packaging failed: {}", e),
            CliError::Deploy(failure) => write!(f, "{} ({})", failure, failure.key),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<IdentityError> for CliError {
    fn from(e: IdentityError) -> Self {
        CliError::Identity(e)
    }
}

impl From<ClientError> for CliError {
    fn from(e: ClientError) -> Self {
        CliError::Client(e)
    }
}

impl From<MigrationError> for CliError {
    fn from(e: MigrationError) -> Self {
        CliError::Migration(e)
    }
}

impl From<PackageError> for CliError {
    fn from(e: PackageError) -> Self {
        CliError::Package(e)
    }
}

impl From<DeploymentFailure> for CliError {
    fn from(e: DeploymentFailure) -> Self {
        CliError::Deploy(e)
    }
}
