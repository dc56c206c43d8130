//! Progress reporting for deployment flows.
//!
//! Flows report `(stage, percent)` pairs through a callback. Reports are
//! fire-and-forget: the flow never waits on the callback.

use std::sync::Arc;

/// Progress callback for deployment operations.
///
/// # Arguments
///
/// * `stage` - Stage the percentage belongs to
/// * `percent` - Progress within the stage (0 - 100)
pub type ProgressCallback = Arc<dyn Fn(ProgressStage, u8) + Send + Sync>;

/// Stages a deployment reports progress for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    /// Overall progress of a flow without finer stages.
    None,
    /// Building the file set of a scene.
    CreateFiles,
    /// Uploading preview imagery.
    UploadRecording,
}

impl ProgressStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "Publishing",
            Self::CreateFiles => "Creating files",
            Self::UploadRecording => "Uploading preview",
        }
    }
}

/// Percentage of `loaded` over `total`, truncated.
///
/// An empty total counts as complete.
pub fn percent(loaded: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((loaded.min(total) * 100) / total) as u8
}

/// Report progress if a callback is present.
pub(crate) fn report(on_progress: Option<&ProgressCallback>, stage: ProgressStage, value: u8) {
    if let Some(cb) = on_progress {
        cb(stage, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_percent_edge_cases() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(5, 3), 100);
    }
}
