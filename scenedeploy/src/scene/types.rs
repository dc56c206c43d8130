//! Scene document types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OrderedMap;

/// Kind of a component definition.
///
/// Types this crate does not act on are carried through by name so that a
/// migrated or packaged document keeps them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Transform,
    GltfShape,
    NftShape,
    Script,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Transform => "Transform",
            ComponentType::GltfShape => "GLTFShape",
            ComponentType::NftShape => "NFTShape",
            ComponentType::Script => "Script",
            ComponentType::Other(name) => name,
        }
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Transform" => ComponentType::Transform,
            "GLTFShape" => ComponentType::GltfShape,
            "NFTShape" => ComponentType::NftShape,
            "Script" => ComponentType::Script,
            _ => ComponentType::Other(name),
        }
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed component with free-form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(default)]
    pub data: Value,
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, kind: ComponentType, data: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }

    /// String field of the component data, if present.
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

/// An entity: a name plus an ordered list of component ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, components: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components,
            extra: Map::new(),
        }
    }
}

/// A catalog entry describing a model and the files it is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    /// File path within the asset → content hash.
    #[serde(default)]
    pub contents: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The entity-component document describing 3D scene content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub entities: OrderedMap<SceneEntity>,
    #[serde(default)]
    pub components: OrderedMap<ComponentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<OrderedMap<Asset>>,
    #[serde(default)]
    pub version: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scene {
    /// Create an empty scene with no entities.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entities: OrderedMap::new(),
            components: OrderedMap::new(),
            assets: None,
            version: 0,
            extra: Map::new(),
        }
    }

    /// Resolve an entity's component ids to their definitions.
    ///
    /// Ids that do not resolve are skipped.
    pub fn entity_components(&self, entity: &SceneEntity) -> Vec<&ComponentDefinition> {
        entity
            .components
            .iter()
            .filter_map(|id| self.components.get(id))
            .collect()
    }

    /// Assets referenced by GLTF shapes in this scene, in component order.
    pub fn used_assets(&self) -> Vec<&Asset> {
        let Some(assets) = self.assets.as_ref() else {
            return Vec::new();
        };

        let mut seen = std::collections::HashSet::new();
        self.components
            .values()
            .filter(|c| c.kind == ComponentType::GltfShape)
            .filter_map(|c| c.data_str("assetId"))
            .filter(|id| seen.insert(id.to_string()))
            .filter_map(|id| assets.get(id))
            .collect()
    }
}
