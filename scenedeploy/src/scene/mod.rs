//! Scene document model.
//!
//! A scene is an entity-component document: entities reference components
//! by id, components carry typed data, and an optional asset catalog
//! describes the models used by GLTF shapes. Maps keep document order.

mod naming;
mod ordered;
mod types;

pub use naming::{
    gltf_shape_name, to_identifier, unique_name, unique_name_legacy, DEFAULT_ENTITY_NAME,
    NFT_ENTITY_NAME,
};
pub use ordered::OrderedMap;
pub use types::{Asset, ComponentDefinition, ComponentType, Scene, SceneEntity};
