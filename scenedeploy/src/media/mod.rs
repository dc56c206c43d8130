//! Preview media: recording, stored references, and blob conversion.

mod capture;
mod source;

use std::path::PathBuf;

use thiserror::Error;

pub use capture::{CaptureRequest, CapturedMedia, ChannelMediaCapture, MediaCapture};
pub use source::{load_media, DirectoryMediaSource, MediaRefs, MediaSource, MEDIA_FILE_NAMES};

/// Errors that can occur while capturing or loading media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// No renderer is listening for capture requests.
    #[error("media capture is unavailable")]
    CaptureUnavailable,

    /// The renderer dropped a request without answering.
    #[error("media capture {operation_id} was cancelled")]
    CaptureCancelled { operation_id: u64 },

    /// A stored media reference could not be read.
    #[error("failed to read media {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reference does not name any stored media.
    #[error("unknown media reference: {0}")]
    UnknownReference(String),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
