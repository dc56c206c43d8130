//! Reduction of content network entities into deployments.
//!
//! Entities are replayed oldest first. A live scene entity sets its key; a
//! tombstone (a scene whose `source.isEmpty` is set) clears it. What is left
//! is the latest visible deployment per key.

use std::collections::BTreeMap;

use tracing::warn;

use super::Deployment;
use crate::client::ContentClient;
use crate::content::Entity;
use crate::coord::{id_to_coords, Coord, Placement, Rotation};
use crate::packager::SceneDefinition;

/// Name given to deployments without a usable title.
pub const UNTITLED_SCENE: &str = "Untitled Scene";

/// Placeholder title some tools write; treated as no title.
const PLACEHOLDER_TITLE: &str = "interactive-text";

/// How an entity is mapped to the key it supersedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentKey {
    /// First pointer: land deployments, keyed by parcel.
    FirstPointer,
    /// Entity id: world deployments, one entity per world.
    EntityId,
}

impl DeploymentKey {
    fn of(self, entity: &Entity) -> Option<&str> {
        match self {
            DeploymentKey::FirstPointer => entity.pointers.first().map(String::as_str),
            DeploymentKey::EntityId => Some(entity.id.as_str()).filter(|id| !id.is_empty()),
        }
    }
}

/// Final state of one key after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduced {
    Live(Deployment),
    /// Cleared by a tombstone at `timestamp`. `placement` is the base parcel
    /// or world name the tombstone was published for.
    Cleared { placement: String, timestamp: i64 },
}

/// Resolves the thumbnail of a scene.
///
/// An absolute http(s) `navmapThumbnail` is used as-is; otherwise it names a
/// file of the entity, served from `<content_url>/contents/<hash>`.
pub fn thumbnail_url(
    definition: &SceneDefinition,
    entity: &Entity,
    content_url: &str,
) -> Option<String> {
    let thumbnail = definition.display.navmap_thumbnail.as_deref()?;
    if thumbnail.starts_with("http://") || thumbnail.starts_with("https://") {
        return Some(thumbnail.to_string());
    }
    let hash = entity.content_hash(thumbnail)?;
    Some(format!(
        "{}/contents/{}",
        content_url.trim_end_matches('/'),
        hash
    ))
}

fn to_deployment(entity: &Entity, definition: SceneDefinition, content_url: &str) -> Deployment {
    let name = definition
        .display
        .title
        .clone()
        .filter(|t| !t.is_empty() && t != PLACEHOLDER_TITLE)
        .unwrap_or_else(|| UNTITLED_SCENE.to_string());
    let thumbnail = thumbnail_url(&definition, entity, content_url);

    let source = definition.source.unwrap_or_default();
    let point = entity
        .pointers
        .first()
        .and_then(|p| id_to_coords(p).ok())
        .or(source.point)
        .unwrap_or_else(|| Coord::new(0, 0));
    let rotation = source.rotation.unwrap_or(Rotation::North);

    Deployment {
        id: entity.id.clone(),
        placement: Placement::new(point, rotation),
        owner: definition.owner,
        timestamp: entity.timestamp,
        layout: source.layout,
        name,
        thumbnail,
        project_id: source.project_id.filter(|id| !id.is_empty()),
        base: definition.scene.base,
        parcels: definition.scene.parcels,
        world: definition.world_configuration.map(|w| w.name),
    }
}

/// Replays entities oldest first and returns the final state per key.
///
/// On a timestamp tie a tombstone is replayed after live entities, so a clear
/// published in the same millisecond as a deploy wins, as it does in the
/// registry. Remaining ties are broken by entity id so the result does not
/// depend on input order. Entities without a key or without readable scene
/// metadata are skipped.
pub fn reduce_entities(
    entities: Vec<Entity>,
    key: DeploymentKey,
    content_url: &str,
) -> BTreeMap<String, Reduced> {
    let mut readable: Vec<(Entity, SceneDefinition)> = entities
        .into_iter()
        .filter_map(|mut entity| {
            let metadata = entity.metadata.take();
            let definition = match metadata.map(serde_json::from_value::<SceneDefinition>) {
                Some(Ok(definition)) => definition,
                Some(Err(e)) => {
                    warn!(entity_id = %entity.id, error = %e, "Skipping entity with unreadable metadata");
                    return None;
                }
                None => {
                    warn!(entity_id = %entity.id, "Skipping entity without metadata");
                    return None;
                }
            };
            Some((entity, definition))
        })
        .collect();

    readable.sort_by(|(a, a_def), (b, b_def)| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a_def.is_empty().cmp(&b_def.is_empty()))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut out = BTreeMap::new();
    for (entity, definition) in readable {
        let Some(id) = key.of(&entity) else {
            continue;
        };
        let id = id.to_string();

        let state = if definition.is_empty() {
            Reduced::Cleared {
                placement: definition
                    .world_configuration
                    .map(|w| w.name)
                    .unwrap_or(definition.scene.base),
                timestamp: entity.timestamp,
            }
        } else {
            Reduced::Live(to_deployment(&entity, definition, content_url))
        };
        out.insert(id, state);
    }
    out
}

/// Visible deployments after replaying `entities`, ordered by key.
pub fn format_deployments(
    entities: Vec<Entity>,
    key: DeploymentKey,
    content_url: &str,
) -> Vec<Deployment> {
    reduce_entities(entities, key, content_url)
        .into_values()
        .filter_map(|state| match state {
            Reduced::Live(deployment) => Some(deployment),
            Reduced::Cleared { .. } => None,
        })
        .collect()
}

/// [`format_deployments`] using a client's content URL.
pub fn format_for_client(
    entities: Vec<Entity>,
    key: DeploymentKey,
    client: &dyn ContentClient,
) -> Vec<Deployment> {
    format_deployments(entities, key, client.content_url())
}
