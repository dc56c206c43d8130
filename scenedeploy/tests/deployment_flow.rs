//! Integration tests for the deployment flows.
//!
//! These tests drive the orchestrator end to end through the public API:
//! - land deploy → fetch from a fresh index → clear → fetch again
//! - world deploy and lookup by world name
//! - pool publishing through the renderer capture handshake
//!
//! Run with: `cargo test --test deployment_flow`

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;

use scenedeploy::client::{
    AssetFetcher, BoxFuture, BuilderApi, ClientError, ClientResult, ContentClient,
    DeployEntityRequest, MediaUpload,
};
use scenedeploy::content::Entity;
use scenedeploy::coord::{Coord, Layout, Placement, Rotation};
use scenedeploy::deployment::{Collaborators, DeploymentOrchestrator, DeploymentRegistry};
use scenedeploy::identity::{verify_auth_chain, Identity, StaticIdentityProvider};
use scenedeploy::media::{
    CaptureRequest, CapturedMedia, ChannelMediaCapture, DirectoryMediaSource, MediaCapture,
    MEDIA_FILE_NAMES,
};
use scenedeploy::progress::{ProgressCallback, ProgressStage};
use scenedeploy::project::Project;
use scenedeploy::scene::Scene;
use scenedeploy::store::InMemoryProjectStore;

// ============================================================================
// Test Collaborators
// ============================================================================

const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

/// Content server that verifies signatures and serves what it stored.
struct MemoryContentServer {
    url: String,
    entities: Mutex<HashMap<String, Entity>>,
}

impl MemoryContentServer {
    fn new(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            entities: Mutex::new(HashMap::new()),
        })
    }

    fn stored(&self) -> usize {
        self.entities.lock().len()
    }

    fn accept(&self, request: &DeployEntityRequest) -> Result<Entity, String> {
        verify_auth_chain(&request.auth_chain, &request.entity_id, Utc::now())
            .map_err(|e| e.to_string())?;
        let raw = request
            .files
            .get(&request.entity_id)
            .ok_or("entity file missing")?;
        let mut value: Value = serde_json::from_slice(raw).map_err(|e| e.to_string())?;
        value["id"] = Value::String(request.entity_id.clone());
        let entity: Entity = serde_json::from_value(value).map_err(|e| e.to_string())?;
        for entry in &entity.content {
            if !request.files.contains_key(&entry.hash) {
                return Err(format!("missing content {}", entry.file));
            }
        }
        Ok(entity)
    }

    fn claims(entity: &Entity, pointer: &str) -> bool {
        let world = entity
            .metadata
            .as_ref()
            .and_then(|m| m["worldConfiguration"]["name"].as_str());
        entity.pointers.iter().any(|p| p == pointer) || world == Some(pointer)
    }
}

impl ContentClient for MemoryContentServer {
    fn content_url(&self) -> &str {
        &self.url
    }

    fn deploy_entity(&self, request: DeployEntityRequest) -> BoxFuture<'_, ClientResult<()>> {
        let result = self
            .accept(&request)
            .map(|entity| {
                self.entities.lock().insert(entity.id.clone(), entity);
            })
            .map_err(|body| ClientError::Status {
                status: 400,
                url: format!("{}/entities", self.url),
                body,
            });
        Box::pin(async move { result })
    }

    fn fetch_entities_by_pointers(
        &self,
        pointers: Vec<String>,
    ) -> BoxFuture<'_, ClientResult<Vec<Entity>>> {
        let found: Vec<Entity> = self
            .entities
            .lock()
            .values()
            .filter(|e| pointers.iter().any(|p| Self::claims(e, p)))
            .cloned()
            .collect();
        Box::pin(async move { Ok(found) })
    }
}

#[derive(Default)]
struct RecordingBuilder {
    uploads: Mutex<Vec<(String, usize)>>,
    pools: AtomicUsize,
}

impl BuilderApi for RecordingBuilder {
    fn upload_media(
        &self,
        project_id: String,
        media: MediaUpload,
        on_progress: Option<ProgressCallback>,
    ) -> BoxFuture<'_, ClientResult<()>> {
        self.uploads.lock().push((project_id, media.total_bytes()));
        if let Some(cb) = on_progress {
            cb(ProgressStage::UploadRecording, 0);
            cb(ProgressStage::UploadRecording, 100);
        }
        Box::pin(async { Ok(()) })
    }

    fn deploy_to_pool(
        &self,
        _project_id: String,
        _additional_info: Option<Value>,
    ) -> BoxFuture<'_, ClientResult<()>> {
        self.pools.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn preview_url(&self, project_id: &str) -> String {
        format!("https://builder.test/projects/{}/media/preview.png", project_id)
    }
}

struct NoAssets;

impl AssetFetcher for NoAssets {
    fn fetch(&self, hash: String) -> BoxFuture<'_, ClientResult<Bytes>> {
        Box::pin(async move {
            Err(ClientError::Decode {
                url: hash,
                reason: "no assets in this test".into(),
            })
        })
    }
}

struct Fixture {
    store: Arc<InMemoryProjectStore>,
    land: Arc<MemoryContentServer>,
    worlds: Arc<MemoryContentServer>,
    builder: Arc<RecordingBuilder>,
    capture: Arc<dyn MediaCapture>,
    media_dir: tempfile::TempDir,
}

impl Fixture {
    fn new(capture: Arc<dyn MediaCapture>) -> Self {
        let store = InMemoryProjectStore::new();
        let project = Project::new("p1", "Plaza", Layout::new(1, 2)).with_scene_id("s1");
        store.insert(project, Scene::new("s1"));
        store.set_current(Some("p1"));
        store.set_logged_in(true);
        store.set_author(Some("ana".into()));

        let media_dir = tempfile::tempdir().unwrap();
        for name in MEDIA_FILE_NAMES {
            std::fs::write(media_dir.path().join(name), name.as_bytes()).unwrap();
        }

        Self {
            store: Arc::new(store),
            land: MemoryContentServer::new("https://peer.test/content"),
            worlds: MemoryContentServer::new("https://worlds.test"),
            builder: Arc::new(RecordingBuilder::default()),
            capture,
            media_dir,
        }
    }

    /// An orchestrator with its own, empty deployment index.
    fn orchestrator(&self) -> DeploymentOrchestrator {
        let identity =
            Identity::from_seed_hex(SEED, Utc::now() + chrono::Duration::days(1)).unwrap();
        DeploymentOrchestrator::new(Collaborators {
            store: self.store.clone(),
            identity: Arc::new(StaticIdentityProvider::new(Some(identity))),
            builder: self.builder.clone(),
            land: self.land.clone(),
            worlds: self.worlds.clone(),
            assets: Arc::new(NoAssets),
            capture: self.capture.clone(),
            media: Arc::new(DirectoryMediaSource::new(self.media_dir.path())),
            registry: Arc::new(DeploymentRegistry::new()),
        })
    }
}

fn idle_capture() -> Arc<dyn MediaCapture> {
    let (capture, _rx) = ChannelMediaCapture::channel(1);
    Arc::new(capture)
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<(ProgressStage, u8)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let cb: ProgressCallback = Arc::new(move |stage: ProgressStage, value: u8| {
        sink.lock().push((stage, value));
    });
    (cb, seen)
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A land deployment is visible to a fresh index and disappears once cleared.
#[tokio::test]
async fn test_land_deploy_fetch_clear_cycle() {
    let fixture = Fixture::new(idle_capture());
    let publisher = fixture.orchestrator();
    let (cb, seen) = recorder();

    let placement = Placement::new(Coord::new(10, 20), Rotation::North);
    let deployed = publisher
        .deploy_to_land("p1", placement, None, Some(cb))
        .await
        .unwrap();
    assert_eq!(fixture.land.stored(), 1);
    assert_eq!(fixture.builder.uploads.lock().len(), 1);

    let stages: Vec<ProgressStage> = seen.lock().iter().map(|(s, _)| *s).collect();
    assert!(stages.contains(&ProgressStage::UploadRecording));
    assert!(stages.contains(&ProgressStage::CreateFiles));

    let coords = vec!["10,20".to_string(), "11,20".to_string()];
    let viewer = fixture.orchestrator();
    let fetched = viewer.fetch_deployments(&coords).await.unwrap();
    assert_eq!(fetched.len(), 1);
    let found = &fetched[0];
    assert_eq!(found.id, deployed.id);
    assert_eq!(found.name, "Plaza");
    assert_eq!(found.owner, deployed.owner);
    assert_eq!(found.placement, placement);
    assert_eq!(found.parcels, coords);
    assert_eq!(found.project_id.as_deref(), Some("p1"));
    assert_eq!(
        found.thumbnail.as_deref(),
        Some("https://builder.test/projects/p1/media/preview.png")
    );
    assert_eq!(viewer.registry().by_coords("11,20").len(), 1);

    let cleared = viewer.clear_deployment(&deployed.id).await.unwrap();
    assert_eq!(cleared, deployed.id);
    assert!(viewer.registry().get(&deployed.id).is_none());
    assert_eq!(fixture.land.stored(), 2);

    let after = fixture.orchestrator().fetch_deployments(&coords).await.unwrap();
    assert!(after.is_empty());
}

/// Clearing an unknown deployment fails before touching the server.
#[tokio::test]
async fn test_clear_unknown_deployment() {
    let fixture = Fixture::new(idle_capture());
    let err = fixture
        .orchestrator()
        .clear_deployment("unknown")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unable to Publish: Invalid deployment");
    assert_eq!(fixture.land.stored(), 0);
}

/// World deployments are stored on the world server and found by name.
#[tokio::test]
async fn test_world_deploy_and_lookup() {
    let fixture = Fixture::new(idle_capture());
    let deployed = fixture
        .orchestrator()
        .deploy_to_world("p1", "ana.dcl.eth", None)
        .await
        .unwrap();
    assert_eq!(fixture.worlds.stored(), 1);
    assert_eq!(fixture.land.stored(), 0);

    let names = vec!["ana.dcl.eth".to_string(), "nobody.dcl.eth".to_string()];
    let viewer = fixture.orchestrator();
    let fetched = viewer.fetch_world_deployments(&names).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, deployed.id);
    assert_eq!(fetched[0].world.as_deref(), Some("ana.dcl.eth"));
    assert!(viewer.registry().by_world("ana.dcl.eth").is_some());
}

/// Pool publishing waits on the renderer's reply and signals a screenshot.
#[tokio::test]
async fn test_pool_publish_with_renderer() {
    let (capture, mut requests) = ChannelMediaCapture::channel(4);
    let renderer = tokio::spawn(async move {
        let mut screenshots = 0;
        while let Some(request) = requests.recv().await {
            match request {
                CaptureRequest::Record { reply, .. } => {
                    let image = |name: &'static str| Some(Bytes::from_static(name.as_bytes()));
                    let _ = reply.send(CapturedMedia {
                        preview: image("preview"),
                        north: image("north"),
                        east: image("east"),
                        south: image("south"),
                        west: image("west"),
                    });
                }
                CaptureRequest::Screenshot => {
                    screenshots += 1;
                    break;
                }
            }
        }
        screenshots
    });

    let fixture = Fixture::new(Arc::new(capture));
    let (cb, seen) = recorder();
    let preview = fixture
        .orchestrator()
        .deploy_to_pool("p1", None, Some(cb))
        .await
        .unwrap();

    assert_eq!(&preview[..], b"preview");
    let values: Vec<u8> = seen.lock().iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![1, 30, 60, 90, 100]);
    assert_eq!(fixture.builder.pools.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.await.unwrap(), 1);
}

/// A renderer that drops the request surfaces as a failure, not a hang.
#[tokio::test]
async fn test_pool_renderer_gone() {
    let (capture, requests) = ChannelMediaCapture::channel(1);
    drop(requests);

    let fixture = Fixture::new(Arc::new(capture));
    let err = fixture
        .orchestrator()
        .deploy_to_pool("p1", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "media capture is unavailable");
    assert_eq!(fixture.builder.pools.load(Ordering::SeqCst), 0);
}
