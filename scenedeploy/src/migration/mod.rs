//! Schema migration engine for versioned documents.
//!
//! Documents written by older clients carry a `version` field. A
//! [`MigrationLadder`] holds a sparse, ordered list of transforms keyed by the
//! version they produce. [`run_migrations`] walks every version from the
//! document's current one up to the highest rung of the ladder, applying the
//! rungs that exist and stamping the document with each version it reaches.
//!
//! # Example
//!
//! ```
//! use scenedeploy::migration::{run_migrations, scene_ladder};
//! use scenedeploy::scene::Scene;
//!
//! let scene = Scene::new("legacy");
//! let migrated = run_migrations(scene, &scene_ladder()).unwrap();
//! assert_eq!(migrated.version, scene_ladder().latest_version().unwrap());
//! ```

mod error;
mod project;
mod scene;

pub use error::{MigrationError, MigrationResult};
pub use project::{
    project_ladder, replace_user_id_with_eth_address, to_project_cloud_schema,
    to_project_cloud_schema_at,
};
pub use scene::{
    add_assets, add_entity_name, add_scale, dedupe_entity_name, remove_script_src,
    sanitize_entity_name, sanitize_entity_name2, scene_ladder,
};

use tracing::debug;

use crate::project::Project;
use crate::scene::Scene;

/// A document that records the schema version it was written with.
pub trait Versioned {
    /// Stored version; `0` means the field was absent.
    fn version(&self) -> u32;

    fn set_version(&mut self, version: u32);
}

impl Versioned for Scene {
    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

impl Versioned for Project {
    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

/// A single transform that upgrades a document by one version.
pub type Migration<T> = Box<dyn Fn(T) -> MigrationResult<T> + Send + Sync>;

/// Ordered, sparse list of `(version, transform)` rungs.
pub struct MigrationLadder<T> {
    steps: Vec<(u32, Migration<T>)>,
}

impl<T> Default for MigrationLadder<T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<T> MigrationLadder<T> {
    /// Create an empty ladder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fallible rung producing `version`.
    ///
    /// Adding a second rung for the same version replaces the first.
    pub fn step<F>(mut self, version: u32, transform: F) -> Self
    where
        F: Fn(T) -> MigrationResult<T> + Send + Sync + 'static,
    {
        let transform: Migration<T> = Box::new(transform);
        match self.steps.binary_search_by_key(&version, |(v, _)| *v) {
            Ok(pos) => self.steps[pos].1 = transform,
            Err(pos) => self.steps.insert(pos, (version, transform)),
        }
        self
    }

    /// Add an infallible rung that edits the document in place.
    pub fn step_mut(self, version: u32, transform: fn(&mut T)) -> Self
    where
        T: 'static,
    {
        self.step(version, move |mut doc: T| {
            transform(&mut doc);
            Ok(doc)
        })
    }

    /// Highest version any rung produces.
    pub fn latest_version(&self) -> Option<u32> {
        self.steps.last().map(|(v, _)| *v)
    }

    /// Versions that have a rung, ascending.
    pub fn versions(&self) -> Vec<u32> {
        self.steps.iter().map(|(v, _)| *v).collect()
    }

    fn get(&self, version: u32) -> Option<&Migration<T>> {
        self.steps
            .binary_search_by_key(&version, |(v, _)| *v)
            .ok()
            .map(|pos| &self.steps[pos].1)
    }
}

/// Upgrades `input` to the latest version of `ladder`.
///
/// A missing or zero version counts as version 1. Versions without a rung
/// pass the document through unchanged. The input is consumed, so a failing
/// rung leaves no partially migrated document behind.
pub fn run_migrations<T: Versioned>(input: T, ladder: &MigrationLadder<T>) -> MigrationResult<T> {
    let Some(latest) = ladder.latest_version() else {
        return Ok(input);
    };

    let mut out = input;
    let mut version = out.version().max(1);

    while version < latest {
        version += 1;
        if let Some(transform) = ladder.get(version) {
            debug!(version, "Applying migration");
            out = transform(out).map_err(|e| e.at_version(version))?;
            out.set_version(version);
        }
    }

    Ok(out)
}
