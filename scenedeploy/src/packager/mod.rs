//! Content packager.
//!
//! Turns a project and its scene into the file set of a deployment:
//!
//! 1. `scene.json`: the [`SceneDefinition`] with parcels, display and source data
//! 2. `builder.json`: a manifest the builder can re-import the scene from
//! 3. `models/<path>`: every file of every catalog asset a GLTF shape uses
//!
//! # Example
//!
//! ```ignore
//! let files = create_files(
//!     CreateFilesOptions::new(&project, &scene, placement).deploy(),
//!     &fetcher,
//! ).await?;
//! let definition = parse_scene_definition(&files)?;
//! ```

mod definition;

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::client::{AssetFetcher, ClientError};
use crate::content::FileMap;
use crate::coord::{parcels_for_layout, CoordError, Placement};
use crate::progress::{percent, report, ProgressCallback, ProgressStage};
use crate::project::Project;
use crate::scene::Scene;

pub use definition::{
    SceneContact, SceneDefinition, SceneDisplay, SceneParcels, SceneSource, WorldConfiguration,
    SCENE_FAVICON, SCENE_MAIN, SOURCE_ORIGIN, SOURCE_VERSION,
};

/// Well-known path of the scene definition.
pub const SCENE_FILE: &str = "scene.json";

/// Well-known path of the builder manifest.
pub const MANIFEST_FILE: &str = "builder.json";

/// Directory model files are written under.
pub const MODELS_DIR: &str = "models";

/// Version of the `builder.json` layout.
pub const MANIFEST_VERSION: u32 = 1;

/// Errors that can occur while packaging a scene.
#[derive(Debug, Error)]
pub enum PackageError {
    /// A model file could not be fetched.
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: ClientError,
    },

    /// A package file is missing.
    #[error("package has no {0}")]
    MissingFile(&'static str),

    /// A document could not be serialized or parsed.
    #[error("invalid {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The project layout does not fit at the requested placement.
    #[error(transparent)]
    Placement(#[from] CoordError),
}

/// Result type for packaging operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Contents of `builder.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderManifest {
    pub version: u32,
    pub project: Project,
    pub scene: Scene,
}

/// Inputs of [`create_files`].
#[derive(Clone)]
pub struct CreateFilesOptions<'a> {
    pub project: &'a Project,
    pub scene: &'a Scene,
    pub placement: Placement,
    /// Display name of the author, written as the contact name.
    pub author: Option<String>,
    /// Address of the deploying wallet, written as the owner.
    pub owner: Option<String>,
    /// Public preview URL, written as the navmap thumbnail.
    pub thumbnail: Option<String>,
    /// Packaging for deployment rather than for a local export.
    pub is_deploy: bool,
    /// Packaging a tombstone.
    pub is_empty: bool,
    pub world: Option<String>,
    pub on_progress: Option<ProgressCallback>,
}

impl<'a> CreateFilesOptions<'a> {
    pub fn new(project: &'a Project, scene: &'a Scene, placement: Placement) -> Self {
        Self {
            project,
            scene,
            placement,
            author: None,
            owner: None,
            thumbnail: None,
            is_deploy: false,
            is_empty: false,
            world: None,
            on_progress: None,
        }
    }

    pub fn deploy(mut self) -> Self {
        self.is_deploy = true;
        self
    }

    pub fn empty(mut self) -> Self {
        self.is_empty = true;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn with_world(mut self, world: Option<String>) -> Self {
        self.world = world;
        self
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }
}

/// Builds the `scene.json` document for a placed project.
pub fn scene_definition(options: &CreateFilesOptions<'_>) -> PackageResult<SceneDefinition> {
    let parcels: Vec<String> = parcels_for_layout(&options.placement, &options.project.layout)?
        .iter()
        .map(|c| c.to_id())
        .collect();

    Ok(SceneDefinition {
        display: SceneDisplay {
            title: Some(options.project.title.clone()),
            navmap_thumbnail: options.thumbnail.clone(),
            favicon: Some(SCENE_FAVICON.to_string()),
        },
        owner: options.owner.clone().unwrap_or_default(),
        contact: SceneContact {
            name: options.author.clone().unwrap_or_default(),
            email: String::new(),
        },
        scene: SceneParcels {
            base: options.placement.point.to_id(),
            parcels,
        },
        main: SCENE_MAIN.to_string(),
        tags: Vec::new(),
        source: Some(SceneSource {
            version: SOURCE_VERSION,
            origin: SOURCE_ORIGIN.to_string(),
            project_id: Some(options.project.id.clone()),
            point: Some(options.placement.point),
            rotation: Some(options.placement.rotation),
            layout: Some(options.project.layout),
            is_empty: options.is_empty,
        }),
        world_configuration: options
            .world
            .clone()
            .map(|name| WorldConfiguration { name }),
        extra: Default::default(),
    })
}

/// Model files used by the scene: `models/<path>` → content hash.
pub fn model_files(scene: &Scene) -> BTreeMap<String, String> {
    scene
        .used_assets()
        .into_iter()
        .flat_map(|asset| asset.contents.iter())
        .map(|(path, hash)| (format!("{}/{}", MODELS_DIR, path), hash.clone()))
        .collect()
}

fn to_json<T: Serialize>(file: &'static str, value: &T) -> PackageResult<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| PackageError::Json { file, source })
}

/// Produces the full file set of a scene package.
///
/// Model files are fetched one at a time; progress is reported per file
/// under `CreateFiles`.
pub async fn create_files(
    options: CreateFilesOptions<'_>,
    fetcher: &dyn AssetFetcher,
) -> PackageResult<FileMap> {
    let on_progress = options.on_progress.as_ref();
    let mut files = FileMap::new();

    let definition = scene_definition(&options)?;
    files.insert(SCENE_FILE.to_string(), to_json(SCENE_FILE, &definition)?);

    let project = if options.is_deploy {
        options.project.without_thumbnail()
    } else {
        options.project.clone()
    };
    let manifest = BuilderManifest {
        version: MANIFEST_VERSION,
        project,
        scene: options.scene.clone(),
    };
    files.insert(MANIFEST_FILE.to_string(), to_json(MANIFEST_FILE, &manifest)?);

    let models = model_files(options.scene);
    let total = models.len();
    report(on_progress, ProgressStage::CreateFiles, percent(0, total));

    for (loaded, (path, hash)) in models.into_iter().enumerate() {
        debug!(path = %path, hash = %hash, "Fetching model file");
        let data = fetcher
            .fetch(hash)
            .await
            .map_err(|source| PackageError::Fetch {
                path: path.clone(),
                source,
            })?;
        files.insert(path, data);
        report(on_progress, ProgressStage::CreateFiles, percent(loaded + 1, total));
    }

    info!(
        project_id = %options.project.id,
        files = files.len(),
        empty = options.is_empty,
        "Created scene files"
    );
    Ok(files)
}

/// Parses `scene.json` back out of a file set.
pub fn parse_scene_definition(files: &FileMap) -> PackageResult<SceneDefinition> {
    let data = files
        .get(SCENE_FILE)
        .ok_or(PackageError::MissingFile(SCENE_FILE))?;
    serde_json::from_slice(data).map_err(|source| PackageError::Json {
        file: SCENE_FILE,
        source,
    })
}
