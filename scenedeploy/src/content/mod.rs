//! Content addressing for the content network.
//!
//! Files are identified by the SHA-256 of their bytes. An entity lists its
//! files by hash, and its own id is the hash of its canonical JSON, so the
//! same package always produces the same entity id for a given timestamp.

mod entity;
mod hash;

use std::collections::BTreeMap;

use bytes::Bytes;
use thiserror::Error;

pub use entity::{
    build_entity, make_content_files, BuildEntityOptions, ContentEntry, ContentFile,
    ContentFiles, Entity, EntityType, PreparedEntity, ENTITY_VERSION,
};
pub use hash::hash_bytes;

/// Path → bytes of a packaged scene, ordered by path.
pub type FileMap = BTreeMap<String, Bytes>;

/// Errors that can occur while building entities.
#[derive(Debug, Error)]
pub enum ContentError {
    /// An entity must claim at least one pointer.
    #[error("entity has no pointers")]
    NoPointers,

    /// Entity JSON could not be produced.
    #[error("entity serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
