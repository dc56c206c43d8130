//! Stored media references and their conversion to bytes.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::{MediaError, MediaResult};
use crate::client::{BoxFuture, MediaUpload};

/// File names a media directory is expected to hold, in upload order.
pub const MEDIA_FILE_NAMES: [&str; 5] = [
    "preview.png",
    "north.png",
    "east.png",
    "south.png",
    "west.png",
];

/// References to the last recorded media of the open project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRefs {
    pub preview: String,
    pub north: String,
    pub east: String,
    pub south: String,
    pub west: String,
}

/// Where recorded media lives between recording and deployment.
pub trait MediaSource: Send + Sync {
    /// References to stored media, if any has been recorded.
    fn media(&self) -> Option<MediaRefs>;

    /// Resolves one reference to its bytes.
    fn to_blob(&self, reference: String) -> BoxFuture<'_, MediaResult<Bytes>>;
}

/// Converts all five references concurrently.
///
/// Fails as a whole if any single conversion fails.
pub async fn load_media(source: &dyn MediaSource, refs: MediaRefs) -> MediaResult<MediaUpload> {
    let (north, east, south, west, preview) = futures::try_join!(
        source.to_blob(refs.north),
        source.to_blob(refs.east),
        source.to_blob(refs.south),
        source.to_blob(refs.west),
        source.to_blob(refs.preview),
    )?;

    Ok(MediaUpload {
        preview,
        north,
        east,
        south,
        west,
    })
}

/// Media stored as PNG files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryMediaSource {
    dir: PathBuf,
}

impl DirectoryMediaSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> String {
        self.dir.join(name).to_string_lossy().into_owned()
    }
}

impl MediaSource for DirectoryMediaSource {
    fn media(&self) -> Option<MediaRefs> {
        if !MEDIA_FILE_NAMES.iter().all(|n| self.dir.join(n).is_file()) {
            return None;
        }
        let [preview, north, east, south, west] = MEDIA_FILE_NAMES.map(|n| self.path(n));
        Some(MediaRefs {
            preview,
            north,
            east,
            south,
            west,
        })
    }

    fn to_blob(&self, reference: String) -> BoxFuture<'_, MediaResult<Bytes>> {
        Box::pin(async move {
            let path = PathBuf::from(reference);
            tokio::fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|source| MediaError::Read { path, source })
        })
    }
}
