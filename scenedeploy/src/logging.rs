//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when a directory is configured, to a daily rolling
//! file as well. `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;

/// Prefix of daily log file names.
pub const LOG_FILE_PREFIX: &str = "scenedeploy.log";

/// Keeps the file writer alive. Dropping it flushes pending lines.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Logging options resolved from settings and command line flags.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub level: String,
    pub directory: Option<PathBuf>,
    /// Emit ANSI colors on stderr.
    pub ansi: bool,
}

impl From<&LoggingSettings> for LoggingOptions {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            directory: settings.directory.clone(),
            ansi: true,
        }
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global subscriber.
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(options: &LoggingOptions) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
    // Local offset lookup can fail once threads exist; fall back to UTC.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(offset, Rfc3339);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.ansi)
        .with_target(false)
        .with_timer(timer.clone())
        .with_filter(filter(&options.level));

    let (file_layer, guard) = match &options.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(timer)
                .with_filter(filter(&options.level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_settings() {
        let settings = LoggingSettings {
            level: "debug".into(),
            directory: Some(PathBuf::from("/tmp/logs")),
        };
        let options = LoggingOptions::from(&settings);
        assert_eq!(options.level, "debug");
        assert_eq!(options.directory, Some(PathBuf::from("/tmp/logs")));
        assert!(options.ansi);
    }
}
