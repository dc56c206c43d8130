//! Project document types.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::coord::Layout;

/// A builder project: metadata around one scene.
///
/// Fields this crate does not interpret are kept in `extra` so that a
/// migrated document round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub scene_id: String,
    /// Owner wallet address; `None` serializes as `null`.
    #[serde(default)]
    pub eth_address: Option<String>,
    #[serde(default, deserialize_with = "timestamp_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "timestamp_string")]
    pub updated_at: String,
    #[serde(default)]
    pub version: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Create a project with the given id, title and layout.
    pub fn new(id: impl Into<String>, title: impl Into<String>, layout: Layout) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            thumbnail: None,
            layout,
            scene_id: String::new(),
            eth_address: None,
            created_at: String::new(),
            updated_at: String::new(),
            version: 0,
            extra: Map::new(),
        }
    }

    /// Set the scene this project owns.
    pub fn with_scene_id(mut self, scene_id: impl Into<String>) -> Self {
        self.scene_id = scene_id.into();
        self
    }

    /// Copy of the project without its thumbnail.
    pub fn without_thumbnail(&self) -> Self {
        Self {
            thumbnail: None,
            ..self.clone()
        }
    }
}

/// Accepts a timestamp written either as a string or as epoch milliseconds.
fn timestamp_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a date string or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok((v as i64).to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}
