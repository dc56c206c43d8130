//! Content network entities.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{hash_bytes, ContentError, ContentResult, FileMap};

/// Entity schema version written by this crate.
pub const ENTITY_VERSION: &str = "v3";

/// Kind of a content network entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Scene,
}

/// One `file → hash` row of an entity's content list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub file: String,
    pub hash: String,
}

/// An entity as stored and served by a content server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default = "default_version")]
    pub version: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub pointers: Vec<String>,
    pub timestamp: i64,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

fn default_version() -> String {
    ENTITY_VERSION.to_string()
}

impl Entity {
    /// Hash of the content entry whose file name is `file`.
    pub fn content_hash(&self, file: &str) -> Option<&str> {
        self.content
            .iter()
            .find(|entry| entry.file == file)
            .map(|entry| entry.hash.as_str())
    }
}

/// A file ready for upload, with its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub path: String,
    pub hash: String,
    pub data: Bytes,
}

/// Hashed files of a deployment, ordered by path.
pub type ContentFiles = Vec<ContentFile>;

/// Hashes every file of a package.
pub fn make_content_files(files: &FileMap) -> ContentFiles {
    files
        .iter()
        .map(|(path, data)| {
            let hash = hash_bytes(data);
            debug!(path = %path, hash = %hash, size = data.len(), "Hashed content file");
            ContentFile {
                path: path.clone(),
                hash,
                data: data.clone(),
            }
        })
        .collect()
}

/// Inputs to [`build_entity`].
#[derive(Debug, Clone)]
pub struct BuildEntityOptions {
    pub kind: EntityType,
    pub pointers: Vec<String>,
    pub metadata: Value,
    pub files: ContentFiles,
    pub timestamp: i64,
}

/// An entity plus the deduplicated blobs it references.
#[derive(Debug, Clone)]
pub struct PreparedEntity {
    pub entity_id: String,
    pub entity: Entity,
    /// Content hash → bytes; includes the entity file itself.
    pub files: BTreeMap<String, Bytes>,
}

/// Fields of an entity that its id is derived from.
#[derive(Serialize)]
struct EntityBody<'a> {
    version: &'a str,
    #[serde(rename = "type")]
    kind: EntityType,
    pointers: &'a [String],
    timestamp: i64,
    content: &'a [ContentEntry],
    metadata: &'a Value,
}

/// Builds an entity whose id is the hash of its canonical JSON.
///
/// The serialized entity is added to the returned file set under its own id
/// so the content server can store it alongside the content.
pub fn build_entity(options: BuildEntityOptions) -> ContentResult<PreparedEntity> {
    if options.pointers.is_empty() {
        return Err(ContentError::NoPointers);
    }

    let content: Vec<ContentEntry> = options
        .files
        .iter()
        .map(|f| ContentEntry {
            file: f.path.clone(),
            hash: f.hash.clone(),
        })
        .collect();

    let body = EntityBody {
        version: ENTITY_VERSION,
        kind: options.kind,
        pointers: &options.pointers,
        timestamp: options.timestamp,
        content: &content,
        metadata: &options.metadata,
    };
    let entity_bytes = serde_json::to_vec(&body)?;
    let entity_id = hash_bytes(&entity_bytes);

    let mut files: BTreeMap<String, Bytes> = options
        .files
        .into_iter()
        .map(|f| (f.hash, f.data))
        .collect();
    files.insert(entity_id.clone(), Bytes::from(entity_bytes));

    let entity = Entity {
        version: ENTITY_VERSION.to_string(),
        id: entity_id.clone(),
        kind: options.kind,
        pointers: options.pointers,
        timestamp: options.timestamp,
        content,
        metadata: Some(options.metadata),
    };

    Ok(PreparedEntity {
        entity_id,
        entity,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_files() -> FileMap {
        let mut files = FileMap::new();
        files.insert("scene.json".into(), Bytes::from_static(b"{}"));
        files.insert("models/a.glb".into(), Bytes::from_static(b"glb"));
        files
    }

    fn options(timestamp: i64) -> BuildEntityOptions {
        BuildEntityOptions {
            kind: EntityType::Scene,
            pointers: vec!["0,0".into()],
            metadata: json!({"display": {"title": "t"}}),
            files: make_content_files(&sample_files()),
            timestamp,
        }
    }

    #[test]
    fn test_make_content_files_ordered_and_hashed() {
        let files = make_content_files(&sample_files());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "models/a.glb");
        assert_eq!(files[0].hash, hash_bytes(b"glb"));
        assert_eq!(files[1].path, "scene.json");
    }

    #[test]
    fn test_build_entity_id_is_deterministic() {
        let a = build_entity(options(1000)).unwrap();
        let b = build_entity(options(1000)).unwrap();
        let c = build_entity(options(1001)).unwrap();
        assert_eq!(a.entity_id, b.entity_id);
        assert_ne!(a.entity_id, c.entity_id);
    }

    #[test]
    fn test_build_entity_includes_entity_file() {
        let prepared = build_entity(options(1)).unwrap();
        assert_eq!(prepared.files.len(), 3);
        let entity_file = &prepared.files[&prepared.entity_id];
        assert_eq!(hash_bytes(entity_file), prepared.entity_id);
        assert_eq!(prepared.entity.content_hash("scene.json"), Some(hash_bytes(b"{}").as_str()));
    }

    #[test]
    fn test_build_entity_requires_pointers() {
        let mut opts = options(1);
        opts.pointers.clear();
        assert!(matches!(build_entity(opts), Err(ContentError::NoPointers)));
    }

    #[test]
    fn test_entity_deserializes_server_shape() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "bafy",
            "type": "scene",
            "pointers": ["1,2"],
            "timestamp": 5,
            "content": [{"file": "scene.json", "hash": "h"}],
            "metadata": {"scene": {"base": "1,2", "parcels": ["1,2"]}}
        }))
        .unwrap();
        assert_eq!(entity.version, "v3");
        assert_eq!(entity.content_hash("scene.json"), Some("h"));
    }
}
