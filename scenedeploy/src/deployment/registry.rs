//! Shared index of known deployments.
//!
//! Records are keyed by placement (base parcel or world name). A record with
//! an older timestamp never replaces a newer one at the same key, and a
//! tombstone timestamp is remembered so that a stale record arriving later
//! cannot resurrect a cleared placement. This makes merges commutative.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::reduce::{reduce_entities, DeploymentKey, Reduced};
use super::Deployment;
use crate::content::Entity;

#[derive(Debug, Default)]
struct RegistryState {
    live: HashMap<String, Deployment>,
    cleared: HashMap<String, i64>,
}

impl RegistryState {
    /// Whether `candidate` is newer than what is stored at its key.
    fn accepts(&self, key: &str, candidate: &Deployment) -> bool {
        if let Some(&cleared_at) = self.cleared.get(key) {
            if candidate.timestamp <= cleared_at {
                return false;
            }
        }
        match self.live.get(key) {
            Some(current) => {
                (candidate.timestamp, &candidate.id) > (current.timestamp, &current.id)
            }
            None => true,
        }
    }

    fn merge_one(&mut self, deployment: Deployment) {
        let key = deployment.placement_key().to_string();
        if self.accepts(&key, &deployment) {
            self.cleared.remove(&key);
            self.live.insert(key, deployment);
        }
    }

    fn clear_at(&mut self, key: &str, timestamp: i64) {
        let newer_live = self
            .live
            .get(key)
            .map(|d| d.timestamp > timestamp)
            .unwrap_or(false);
        if newer_live {
            return;
        }
        self.live.remove(key);
        let entry = self.cleared.entry(key.to_string()).or_insert(timestamp);
        *entry = (*entry).max(timestamp);
    }
}

/// Thread-safe deployment index.
#[derive(Debug, Default)]
pub struct DeploymentRegistry {
    state: RwLock<RegistryState>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a batch with last-write-wins by timestamp per key.
    pub fn merge(&self, batch: impl IntoIterator<Item = Deployment>) {
        let mut state = self.state.write();
        for deployment in batch {
            state.merge_one(deployment);
        }
    }

    /// Reduces entities and folds the outcome into the index.
    ///
    /// Live results merge as in [`merge`](Self::merge); tombstones clear
    /// their key unless a newer record is already stored.
    pub fn apply_entities(&self, entities: Vec<Entity>, key: DeploymentKey, content_url: &str) {
        let reduced = reduce_entities(entities, key, content_url);
        let mut state = self.state.write();
        for outcome in reduced.into_values() {
            match outcome {
                Reduced::Live(deployment) => state.merge_one(deployment),
                Reduced::Cleared {
                    placement,
                    timestamp,
                } => state.clear_at(&placement, timestamp),
            }
        }
    }

    /// Records a fresh deployment, dropping the one it overrides.
    pub fn insert(&self, deployment: Deployment, override_id: Option<&str>) {
        let mut state = self.state.write();
        if let Some(id) = override_id {
            state.live.retain(|_, d| d.id != id);
        }
        let key = deployment.placement_key().to_string();
        debug!(id = %deployment.id, key = %key, "Registered deployment");
        state.cleared.remove(&key);
        state.live.insert(key, deployment);
    }

    /// Forgets a deployment by id. Returns the removed record.
    pub fn remove(&self, id: &str) -> Option<Deployment> {
        let mut state = self.state.write();
        let key = state
            .live
            .iter()
            .find(|(_, d)| d.id == id)
            .map(|(k, _)| k.clone())?;
        state.live.remove(&key)
    }

    /// A deployment by id.
    pub fn get(&self, id: &str) -> Option<Deployment> {
        self.state.read().live.values().find(|d| d.id == id).cloned()
    }

    /// Deployments covering parcel `coord_id`.
    pub fn by_coords(&self, coord_id: &str) -> Vec<Deployment> {
        let mut out: Vec<_> = self
            .state
            .read()
            .live
            .values()
            .filter(|d| d.world.is_none() && d.covers(coord_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// The deployment of a world, if any.
    pub fn by_world(&self, world: &str) -> Option<Deployment> {
        self.state
            .read()
            .live
            .values()
            .find(|d| d.world.as_deref() == Some(world))
            .cloned()
    }

    /// All deployments, ordered by key.
    pub fn all(&self) -> Vec<Deployment> {
        let state = self.state.read();
        let mut keys: Vec<_> = state.live.keys().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|k| state.live.get(k).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().live.is_empty()
    }
}
