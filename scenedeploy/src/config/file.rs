//! INI-backed configuration file.

use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::{ConfigError, ConfigResult};

pub const DEFAULT_LAND_URL: &str = "https://peer.decentraland.org/content";
pub const DEFAULT_WORLDS_URL: &str = "https://worlds-content-server.decentraland.org";
pub const DEFAULT_BUILDER_URL: &str = "https://builder-api.decentraland.org/v1";
pub const DEFAULT_ASSETS_URL: &str = "https://builder-api.decentraland.org/v1/storage";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Content servers deployments are published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    pub land_url: String,
    pub worlds_url: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            land_url: DEFAULT_LAND_URL.to_string(),
            worlds_url: DEFAULT_WORLDS_URL.to_string(),
        }
    }
}

/// Builder backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSettings {
    pub api_url: String,
    /// Storage serving model files by content hash.
    pub assets_url: String,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BUILDER_URL.to_string(),
            assets_url: DEFAULT_ASSETS_URL.to_string(),
        }
    }
}

/// Signing identity location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySettings {
    pub key_file: Option<PathBuf>,
    /// Expected owner address, checked when the key is loaded.
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    /// Directory for daily log files; console only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// All user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub content: ContentSettings,
    pub builder: BuilderSettings,
    pub identity: IdentitySettings,
    pub logging: LoggingSettings,
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("scenedeploy")
        .join("config.ini")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl ConfigFile {
    /// Loads from the default path.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Reads settings out of a parsed INI document.
    pub fn from_ini(ini: &Ini) -> Self {
        let get = |section: &str, key: &str| non_empty(ini.get_from(Some(section), key));
        let defaults = Self::default();

        Self {
            content: ContentSettings {
                land_url: get("content", "land_url").unwrap_or(defaults.content.land_url),
                worlds_url: get("content", "worlds_url").unwrap_or(defaults.content.worlds_url),
            },
            builder: BuilderSettings {
                api_url: get("builder", "api_url").unwrap_or(defaults.builder.api_url),
                assets_url: get("builder", "assets_url").unwrap_or(defaults.builder.assets_url),
            },
            identity: IdentitySettings {
                key_file: get("identity", "key_file").map(|p| expand_home(&p)),
                address: get("identity", "address"),
            },
            logging: LoggingSettings {
                level: get("logging", "level").unwrap_or(defaults.logging.level),
                directory: get("logging", "directory").map(|p| expand_home(&p)),
            },
        }
    }

    fn to_ini(&self) -> Ini {
        let path_string = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        let mut ini = Ini::new();
        ini.with_section(Some("content"))
            .set("land_url", self.content.land_url.as_str())
            .set("worlds_url", self.content.worlds_url.as_str());
        ini.with_section(Some("builder"))
            .set("api_url", self.builder.api_url.as_str())
            .set("assets_url", self.builder.assets_url.as_str());
        ini.with_section(Some("identity"))
            .set("key_file", path_string(&self.identity.key_file))
            .set("address", self.identity.address.clone().unwrap_or_default());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("directory", path_string(&self.logging.directory));
        ini
    }

    /// Saves to the default path.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)
    }

    pub fn with_land_url(mut self, url: impl Into<String>) -> Self {
        self.content.land_url = url.into();
        self
    }

    pub fn with_worlds_url(mut self, url: impl Into<String>) -> Self {
        self.content.worlds_url = url.into();
        self
    }

    pub fn with_builder_url(mut self, url: impl Into<String>) -> Self {
        self.builder.api_url = url.into();
        self
    }

    pub fn with_assets_url(mut self, url: impl Into<String>) -> Self {
        self.builder.assets_url = url.into();
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity.key_file = Some(path.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    pub fn with_log_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logging.directory = Some(dir.into());
        self
    }
}

/// Expands a leading `~` to the home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
