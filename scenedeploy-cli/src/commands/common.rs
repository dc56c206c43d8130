//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use scenedeploy::client::{HttpAssetFetcher, HttpBuilderApi, HttpContentClient};
use scenedeploy::config::ConfigFile;
use scenedeploy::coord::Rotation;
use scenedeploy::deployment::{Collaborators, DeploymentOrchestrator, DeploymentRegistry};
use scenedeploy::identity::{Identity, StaticIdentityProvider};
use scenedeploy::media::{CaptureRequest, CapturedMedia, ChannelMediaCapture, DirectoryMediaSource};
use scenedeploy::migration::{project_ladder, run_migrations, scene_ladder};
use scenedeploy::progress::{ProgressCallback, ProgressStage};
use scenedeploy::project::Project;
use scenedeploy::scene::Scene;
use scenedeploy::store::InMemoryProjectStore;

use crate::error::CliError;

/// File holding the project document inside a workspace.
pub const PROJECT_FILE: &str = "project.json";
/// File holding the scene document inside a workspace.
pub const SCENE_FILE: &str = "scene.json";
/// Directory holding recorded preview images inside a workspace.
pub const MEDIA_DIR: &str = "media";

/// Scene rotation for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum RotationArg {
    North,
    East,
    South,
    West,
}

impl From<RotationArg> for Rotation {
    fn from(arg: RotationArg) -> Self {
        match arg {
            RotationArg::North => Rotation::North,
            RotationArg::East => Rotation::East,
            RotationArg::South => Rotation::South,
            RotationArg::West => Rotation::West,
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let data = std::fs::read(path).map_err(|e| CliError::io(path, e))?;
    serde_json::from_slice(&data).map_err(|e| CliError::json(path, e))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| CliError::json(path, e))?;
    std::fs::write(path, data).map_err(|e| CliError::io(path, e))
}

/// A project directory: `project.json`, `scene.json` and optional media.
pub struct Workspace {
    pub dir: PathBuf,
    pub project: Project,
    pub scene: Scene,
}

impl Workspace {
    /// Loads and migrates both documents.
    pub fn load(dir: &Path) -> Result<Self, CliError> {
        let project: Project = read_json(&dir.join(PROJECT_FILE))?;
        let scene: Scene = read_json(&dir.join(SCENE_FILE))?;

        let mut project = run_migrations(project, &project_ladder())?;
        let scene = run_migrations(scene, &scene_ladder())?;
        if project.scene_id.is_empty() {
            project.scene_id = scene.id.clone();
        }
        debug!(project_id = %project.id, dir = %dir.display(), "Loaded workspace");

        Ok(Self {
            dir: dir.to_path_buf(),
            project,
            scene,
        })
    }

    pub fn media_dir(&self) -> PathBuf {
        self.dir.join(MEDIA_DIR)
    }
}

/// Loads the signing identity named in the configuration, if any.
pub fn load_identity(config: &ConfigFile) -> Result<Option<Identity>, CliError> {
    let Some(path) = &config.identity.key_file else {
        return Ok(None);
    };
    let identity = Identity::load(path, config.identity.address.as_deref())?;
    info!(address = %identity.address(), "Loaded identity");
    Ok(Some(identity))
}

/// Options for wiring the flows.
pub struct Wiring<'a> {
    pub config: &'a ConfigFile,
    pub workspace: Option<&'a Workspace>,
    pub author: Option<String>,
    pub capture: ChannelMediaCapture,
}

/// Builds an orchestrator over the HTTP clients from `config`.
pub fn build_orchestrator(wiring: Wiring<'_>) -> Result<DeploymentOrchestrator, CliError> {
    let config = wiring.config;
    let identity = load_identity(config)?;

    let store = InMemoryProjectStore::new();
    store.set_logged_in(identity.is_some());
    store.set_author(wiring.author);
    let media_dir = match wiring.workspace {
        Some(workspace) => {
            store.insert(workspace.project.clone(), workspace.scene.clone());
            store.set_current(Some(&workspace.project.id));
            workspace.media_dir()
        }
        None => PathBuf::from(MEDIA_DIR),
    };

    Ok(DeploymentOrchestrator::new(Collaborators {
        store: Arc::new(store),
        identity: Arc::new(StaticIdentityProvider::new(identity)),
        builder: Arc::new(HttpBuilderApi::new(&config.builder.api_url)?),
        land: Arc::new(HttpContentClient::new(&config.content.land_url)?),
        worlds: Arc::new(HttpContentClient::new(&config.content.worlds_url)?),
        assets: Arc::new(HttpAssetFetcher::new(&config.builder.assets_url)?),
        capture: Arc::new(wiring.capture),
        media: Arc::new(DirectoryMediaSource::new(media_dir)),
        registry: Arc::new(DeploymentRegistry::new()),
    }))
}

/// A progress bar fed by flow progress reports.
pub fn progress_bar() -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new(100);
    let bar_style = ProgressStyle::with_template("{msg:>18} [{bar:40.cyan/blue}] {pos:>3}%")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(bar_style);

    let handle = pb.clone();
    let callback: ProgressCallback = Arc::new(move |stage: ProgressStage, value: u8| {
        handle.set_message(stage.name());
        handle.set_position(u64::from(value));
    });
    (pb, callback)
}

/// Prints a success line.
pub fn print_ok(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

async fn read_image(dir: &Path, name: &str) -> Option<Bytes> {
    match tokio::fs::read(dir.join(name)).await {
        Ok(data) => Some(Bytes::from(data)),
        Err(e) => {
            debug!(name, error = %e, "Preview image unavailable");
            None
        }
    }
}

/// Serves capture requests from pre-rendered images in `dir`.
///
/// Stands in for the editor's renderer: a recording answers with whatever
/// of the five images exist on disk.
pub fn spawn_file_renderer(dir: PathBuf) -> ChannelMediaCapture {
    let (capture, mut requests) = ChannelMediaCapture::channel(4);
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            match request {
                CaptureRequest::Record {
                    operation_id,
                    reply,
                } => {
                    debug!(operation_id, dir = %dir.display(), "Serving recording");
                    let media = CapturedMedia {
                        preview: read_image(&dir, "preview.png").await,
                        north: read_image(&dir, "north.png").await,
                        east: read_image(&dir, "east.png").await,
                        south: read_image(&dir, "south.png").await,
                        west: read_image(&dir, "west.png").await,
                    };
                    if reply.send(media).is_err() {
                        debug!(operation_id, "Recording requester went away");
                    }
                }
                CaptureRequest::Screenshot => debug!("Screenshot requested"),
            }
        }
    });
    capture
}

/// A capture handle with no renderer behind it.
pub fn no_renderer() -> ChannelMediaCapture {
    let (capture, requests): (ChannelMediaCapture, mpsc::Receiver<CaptureRequest>) =
        ChannelMediaCapture::channel(1);
    drop(requests);
    capture
}
