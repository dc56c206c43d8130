use thiserror::Error;

/// Errors raised while upgrading a versioned document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// A transform rejected the document.
    #[error("migration to version {version} failed: {reason}")]
    StepFailed { version: u32, reason: String },

    /// A date field could not be interpreted.
    #[error("invalid date in field {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
}

impl MigrationError {
    /// A step failure whose version is filled in by the ladder runner.
    pub fn step(reason: impl Into<String>) -> Self {
        MigrationError::StepFailed {
            version: 0,
            reason: reason.into(),
        }
    }

    /// Attach the version being produced when the transform failed.
    pub(crate) fn at_version(self, version: u32) -> Self {
        match self {
            MigrationError::StepFailed { reason, .. } => {
                MigrationError::StepFailed { version, reason }
            }
            other => other,
        }
    }
}

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
