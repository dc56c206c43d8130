//! User configuration.
//!
//! Settings live in an INI file at `~/.config/scenedeploy/config.ini`. A
//! missing file yields defaults; a present file only needs the keys it
//! overrides.
//!
//! ```ini
//! [content]
//! land_url = https://peer.decentraland.org/content
//! worlds_url = https://worlds-content-server.decentraland.org
//!
//! [builder]
//! api_url = https://builder-api.decentraland.org/v1
//! assets_url = https://builder-api.decentraland.org/v1/storage
//!
//! [identity]
//! key_file = ~/.config/scenedeploy/identity.key
//! address =
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! Individual settings are addressed as `section.key` through [`ConfigKey`].

mod file;
mod keys;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{
    config_file_path, BuilderSettings, ConfigFile, ContentSettings, IdentitySettings,
    LoggingSettings, DEFAULT_ASSETS_URL, DEFAULT_BUILDER_URL, DEFAULT_LAND_URL,
    DEFAULT_LOG_LEVEL, DEFAULT_WORLDS_URL,
};
pub use keys::ConfigKey;

/// Errors that can occur while reading or changing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
