//! The exported `scene.json` document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coord::{Coord, Layout, Rotation};

/// Origin tag written into `source.origin`.
pub const SOURCE_ORIGIN: &str = "builder";

/// Version of the `source` block.
pub const SOURCE_VERSION: u32 = 1;

/// Entry point of a packaged scene.
pub const SCENE_MAIN: &str = "bin/game.js";

/// Favicon reference written into `display.favicon`.
pub const SCENE_FAVICON: &str = "favicon_asset";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDisplay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navmap_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Parcels claimed by the scene; `base` is one of `parcels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneParcels {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub parcels: Vec<String>,
}

/// Where the scene came from and how it was placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSource {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub point: Option<Coord>,
    #[serde(default)]
    pub rotation: Option<Rotation>,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfiguration {
    pub name: String,
}

/// Metadata of a scene entity.
///
/// Parsing is lenient: documents written by other tools may omit any block,
/// and unknown blocks are carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDefinition {
    #[serde(default)]
    pub display: SceneDisplay,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub contact: SceneContact,
    #[serde(default)]
    pub scene: SceneParcels,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SceneSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_configuration: Option<WorldConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneDefinition {
    /// Whether this definition marks an un-published placement.
    pub fn is_empty(&self) -> bool {
        self.source.as_ref().map(|s| s.is_empty).unwrap_or(false)
    }
}
