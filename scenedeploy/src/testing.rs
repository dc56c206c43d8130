//! Mock collaborators for unit tests.
//!
//! Every mock counts its calls so tests can assert which services a flow
//! touched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::client::{
    AssetFetcher, BoxFuture, BuilderApi, ClientError, ClientResult, ContentClient,
    DeployEntityRequest, MediaUpload,
};
use crate::content::Entity;
use crate::coord::Layout;
use crate::deployment::{Collaborators, DeploymentOrchestrator, DeploymentRegistry};
use crate::identity::{Identity, StaticIdentityProvider};
use crate::media::{CapturedMedia, MediaCapture, MediaError, MediaRefs, MediaResult, MediaSource};
use crate::progress::{ProgressCallback, ProgressStage};
use crate::project::Project;
use crate::scene::Scene;
use crate::store::InMemoryProjectStore;

/// RFC 8032 test vector 1 secret key.
pub(crate) const TEST_SEED: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

pub(crate) fn test_identity() -> Identity {
    Identity::from_seed_hex(TEST_SEED, Utc::now() + Duration::days(1))
        .expect("test seed is valid")
}

/// Asset storage that serves each hash's own bytes.
#[derive(Default)]
pub(crate) struct MockAssetFetcher {
    fail: bool,
    calls: AtomicUsize,
}

impl MockAssetFetcher {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for MockAssetFetcher {
    fn fetch(&self, hash: String) -> BoxFuture<'_, ClientResult<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail {
            Err(ClientError::Status {
                status: 404,
                url: format!("mock://assets/{}", hash),
                body: "not found".into(),
            })
        } else {
            Ok(Bytes::from(hash.into_bytes()))
        };
        Box::pin(async move { result })
    }
}

/// Content server holding a fixed set of entities.
pub(crate) struct MockContentClient {
    url: String,
    entities: Mutex<Vec<Entity>>,
    deployed: Mutex<Vec<DeployEntityRequest>>,
    requested: Mutex<Vec<Vec<String>>>,
    deploy_error: Mutex<Option<String>>,
}

impl MockContentClient {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            entities: Mutex::new(Vec::new()),
            deployed: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
            deploy_error: Mutex::new(None),
        }
    }

    pub(crate) fn set_entities(&self, entities: Vec<Entity>) {
        *self.entities.lock() = entities;
    }

    /// Makes every deploy fail with a server error whose body is `body`.
    pub(crate) fn fail_deploys(&self, body: &str) {
        *self.deploy_error.lock() = Some(body.to_string());
    }

    pub(crate) fn deployed(&self) -> Vec<DeployEntityRequest> {
        self.deployed.lock().clone()
    }

    pub(crate) fn deploy_calls(&self) -> usize {
        self.deployed.lock().len()
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.requested.lock().len()
    }

    pub(crate) fn requested_pointers(&self) -> Vec<Vec<String>> {
        self.requested.lock().clone()
    }
}

impl ContentClient for MockContentClient {
    fn content_url(&self) -> &str {
        &self.url
    }

    fn deploy_entity(&self, request: DeployEntityRequest) -> BoxFuture<'_, ClientResult<()>> {
        let result = match self.deploy_error.lock().clone() {
            Some(body) => Err(ClientError::Status {
                status: 500,
                url: format!("{}/entities", self.url),
                body,
            }),
            None => {
                self.deployed.lock().push(request);
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn fetch_entities_by_pointers(
        &self,
        pointers: Vec<String>,
    ) -> BoxFuture<'_, ClientResult<Vec<Entity>>> {
        let found: Vec<Entity> = self
            .entities
            .lock()
            .iter()
            .filter(|e| e.pointers.iter().any(|p| pointers.contains(p)))
            .cloned()
            .collect();
        self.requested.lock().push(pointers);
        Box::pin(async move { Ok(found) })
    }
}

/// Builder backend that accepts everything.
#[derive(Default)]
pub(crate) struct MockBuilderApi {
    uploads: AtomicUsize,
    pools: AtomicUsize,
}

impl MockBuilderApi {
    pub(crate) fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub(crate) fn pool_calls(&self) -> usize {
        self.pools.load(Ordering::SeqCst)
    }
}

impl BuilderApi for MockBuilderApi {
    fn upload_media(
        &self,
        _project_id: String,
        _media: MediaUpload,
        on_progress: Option<ProgressCallback>,
    ) -> BoxFuture<'_, ClientResult<()>> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(cb) = on_progress {
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
        format!("https://builder/projects/{}/media/preview.png", project_id)
    }
}

/// All five images, each holding its own name.
pub(crate) fn full_capture() -> CapturedMedia {
    CapturedMedia {
        preview: Some(Bytes::from_static(b"preview")),
        north: Some(Bytes::from_static(b"north")),
        east: Some(Bytes::from_static(b"east")),
        south: Some(Bytes::from_static(b"south")),
        west: Some(Bytes::from_static(b"west")),
    }
}

/// Renderer that answers every recording with a preset result.
pub(crate) struct MockMediaCapture {
    result: Mutex<CapturedMedia>,
    records: AtomicUsize,
    screenshots: AtomicUsize,
}

impl Default for MockMediaCapture {
    fn default() -> Self {
        Self {
            result: Mutex::new(full_capture()),
            records: AtomicUsize::new(0),
            screenshots: AtomicUsize::new(0),
        }
    }
}

impl MockMediaCapture {
    pub(crate) fn set_result(&self, media: CapturedMedia) {
        *self.result.lock() = media;
    }

    pub(crate) fn record_calls(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }

    pub(crate) fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }
}

impl MediaCapture for MockMediaCapture {
    fn record(&self) -> BoxFuture<'_, MediaResult<CapturedMedia>> {
        self.records.fetch_add(1, Ordering::SeqCst);
        let media = self.result.lock().clone();
        Box::pin(async move { Ok(media) })
    }

    fn take_screenshot(&self) {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stored media whose blobs are the reference strings themselves.
pub(crate) struct MockMediaSource {
    refs: Option<MediaRefs>,
}

impl MockMediaSource {
    pub(crate) fn new(refs: Option<MediaRefs>) -> Self {
        Self { refs }
    }

    pub(crate) fn refs() -> MediaRefs {
        MediaRefs {
            preview: "mem://preview".into(),
            north: "mem://north".into(),
            east: "mem://east".into(),
            south: "mem://south".into(),
            west: "mem://west".into(),
        }
    }
}

impl MediaSource for MockMediaSource {
    fn media(&self) -> Option<MediaRefs> {
        self.refs.clone()
    }

    fn to_blob(&self, reference: String) -> BoxFuture<'_, MediaResult<Bytes>> {
        let result = if reference.starts_with("mem://") {
            Ok(Bytes::from(reference.into_bytes()))
        } else {
            Err(MediaError::UnknownReference(reference))
        };
        Box::pin(async move { result })
    }
}

/// One project `p1` ("Plaza", one row by two columns) with mocks around it.
pub(crate) struct Harness {
    pub store: Arc<InMemoryProjectStore>,
    pub identity: Arc<StaticIdentityProvider>,
    pub builder: Arc<MockBuilderApi>,
    pub land: Arc<MockContentClient>,
    pub worlds: Arc<MockContentClient>,
    pub assets: Arc<MockAssetFetcher>,
    pub capture: Arc<MockMediaCapture>,
    pub media: Arc<MockMediaSource>,
    pub registry: Arc<DeploymentRegistry>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::build(Some(MockMediaSource::refs()), Some(test_identity()))
    }

    pub(crate) fn with_media(refs: Option<MediaRefs>) -> Self {
        Self::build(refs, Some(test_identity()))
    }

    pub(crate) fn without_identity() -> Self {
        Self::build(Some(MockMediaSource::refs()), None)
    }

    fn build(refs: Option<MediaRefs>, identity: Option<Identity>) -> Self {
        let store = InMemoryProjectStore::new();
        let project = Project::new("p1", "Plaza", Layout::new(1, 2)).with_scene_id("s1");
        store.insert(project, Scene::new("s1"));

        Self {
            store: Arc::new(store),
            identity: Arc::new(StaticIdentityProvider::new(identity)),
            builder: Arc::new(MockBuilderApi::default()),
            land: Arc::new(MockContentClient::new("https://peer/content")),
            worlds: Arc::new(MockContentClient::new("https://worlds")),
            assets: Arc::new(MockAssetFetcher::default()),
            capture: Arc::new(MockMediaCapture::default()),
            media: Arc::new(MockMediaSource::new(refs)),
            registry: Arc::new(DeploymentRegistry::new()),
        }
    }

    pub(crate) fn orchestrator(&self) -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(Collaborators {
            store: self.store.clone(),
            identity: self.identity.clone(),
            builder: self.builder.clone(),
            land: self.land.clone(),
            worlds: self.worlds.clone(),
            assets: self.assets.clone(),
            capture: self.capture.clone(),
            media: self.media.clone(),
            registry: self.registry.clone(),
        })
    }
}
