//! Addressable configuration keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::expand_home;
use super::{ConfigError, ConfigFile, ConfigResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ContentLandUrl,
    ContentWorldsUrl,
    BuilderApiUrl,
    BuilderAssetsUrl,
    IdentityKeyFile,
    IdentityAddress,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ContentLandUrl,
            ConfigKey::ContentWorldsUrl,
            ConfigKey::BuilderApiUrl,
            ConfigKey::BuilderAssetsUrl,
            ConfigKey::IdentityKeyFile,
            ConfigKey::IdentityAddress,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ContentLandUrl => "content.land_url",
            ConfigKey::ContentWorldsUrl => "content.worlds_url",
            ConfigKey::BuilderApiUrl => "builder.api_url",
            ConfigKey::BuilderAssetsUrl => "builder.assets_url",
            ConfigKey::IdentityKeyFile => "identity.key_file",
            ConfigKey::IdentityAddress => "identity.address",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or_default()
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or_default()
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        match self {
            ConfigKey::ContentLandUrl => config.content.land_url.clone(),
            ConfigKey::ContentWorldsUrl => config.content.worlds_url.clone(),
            ConfigKey::BuilderApiUrl => config.builder.api_url.clone(),
            ConfigKey::BuilderAssetsUrl => config.builder.assets_url.clone(),
            ConfigKey::IdentityKeyFile => path(&config.identity.key_file),
            ConfigKey::IdentityAddress => config.identity.address.clone().unwrap_or_default(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => path(&config.logging.directory),
        }
    }

    /// Validates and stores `value`. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        let optional_path = |v: &str| (!v.is_empty()).then(|| expand_home(v));

        match self {
            ConfigKey::ContentLandUrl => config.content.land_url = self.url(value)?,
            ConfigKey::ContentWorldsUrl => config.content.worlds_url = self.url(value)?,
            ConfigKey::BuilderApiUrl => config.builder.api_url = self.url(value)?,
            ConfigKey::BuilderAssetsUrl => config.builder.assets_url = self.url(value)?,
            ConfigKey::IdentityKeyFile => config.identity.key_file = optional_path(value),
            ConfigKey::IdentityAddress => {
                config.identity.address = if value.is_empty() {
                    None
                } else {
                    Some(self.address(value)?)
                }
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, format!("expected one of {}", LOG_LEVELS.join(", "))));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => config.logging.directory = optional_path(value),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn url(&self, value: &str) -> ConfigResult<String> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(value.trim_end_matches('/').to_string())
        } else {
            Err(self.invalid(value, "must be an http(s) URL"))
        }
    }

    fn address(&self, value: &str) -> ConfigResult<String> {
        let hex_part = value
            .strip_prefix("0x")
            .ok_or_else(|| self.invalid(value, "must start with 0x"))?;
        if hex_part.is_empty() || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.invalid(value, "must be hex encoded"));
        }
        Ok(value.to_ascii_lowercase())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
