//! Deployment flows.
//!
//! Each public method runs one flow to completion and either returns its
//! outcome or a [`DeploymentFailure`] tagged with what it was acting on.
//! Flows do not retry and stop at the first error.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::reduce::{format_deployments, DeploymentKey};
use super::{DeployError, DeployResult, Deployment, DeploymentFailure, DeploymentRegistry, FailureKey};
use crate::client::{AssetFetcher, BuilderApi, ContentClient, DeployEntityRequest};
use crate::content::{make_content_files, ContentError, EntityType};
use crate::coord::Placement;
use crate::identity::{Identity, IdentityProvider};
use crate::land::{coords_for_lands, EstateIndex, LandSelection};
use crate::media::{load_media, MediaCapture, MediaSource};
use crate::migration::{run_migrations, scene_ladder};
use crate::packager::{create_files, parse_scene_definition, CreateFilesOptions, SceneDefinition};
use crate::progress::{report, ProgressCallback, ProgressStage};
use crate::project::{empty_deployment, Project, UNPUBLISHED_PROJECT_ID};
use crate::scene::Scene;
use crate::store::ProjectStore;

/// Everything the flows talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ProjectStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub builder: Arc<dyn BuilderApi>,
    /// Content server for land deployments.
    pub land: Arc<dyn ContentClient>,
    /// Content server for world deployments.
    pub worlds: Arc<dyn ContentClient>,
    pub assets: Arc<dyn AssetFetcher>,
    pub capture: Arc<dyn MediaCapture>,
    pub media: Arc<dyn MediaSource>,
    pub registry: Arc<DeploymentRegistry>,
}

/// Runs deployment flows against a set of collaborators.
pub struct DeploymentOrchestrator {
    deps: Collaborators,
}

/// Where a scene is being published.
enum Target<'a> {
    Land(Placement),
    World(&'a str),
}

impl Target<'_> {
    fn placement(&self) -> Placement {
        match self {
            Target::Land(placement) => *placement,
            Target::World(_) => Placement::origin(),
        }
    }

    fn world(&self) -> Option<String> {
        match self {
            Target::Land(_) => None,
            Target::World(name) => Some(name.to_string()),
        }
    }
}

impl DeploymentOrchestrator {
    pub fn new(deps: Collaborators) -> Self {
        Self { deps }
    }

    /// Shared deployment index updated by the flows.
    pub fn registry(&self) -> &Arc<DeploymentRegistry> {
        &self.deps.registry
    }

    /// Publishes the open project to the public scene pool.
    ///
    /// Returns the recorded preview image.
    pub async fn deploy_to_pool(
        &self,
        project_id: &str,
        additional_info: Option<Value>,
        on_progress: Option<ProgressCallback>,
    ) -> DeployResult<Bytes> {
        self.pool(project_id, additional_info, on_progress.as_ref())
            .await
            .map_err(|e| DeploymentFailure::new(FailureKey::Project(project_id.to_string()), e))
    }

    async fn pool(
        &self,
        project_id: &str,
        additional_info: Option<Value>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Bytes, DeployError> {
        let project = self
            .deps
            .store
            .current_project()
            .ok_or(DeployError::InvalidProject)?;
        if project.id != project_id {
            return Err(DeployError::NotCurrentProject);
        }

        info!(project_id = %project.id, "Publishing to pool");
        report(on_progress, ProgressStage::None, 1);

        let media = self
            .deps
            .capture
            .record()
            .await?
            .complete()
            .ok_or(DeployError::CaptureFailed)?;
        let preview = media.preview.clone();
        report(on_progress, ProgressStage::None, 30);

        self.deps
            .builder
            .upload_media(project.id.clone(), media, None)
            .await?;
        report(on_progress, ProgressStage::None, 60);

        self.deps.capture.take_screenshot();
        report(on_progress, ProgressStage::None, 90);

        self.deps
            .builder
            .deploy_to_pool(project.id.clone(), additional_info)
            .await?;
        report(on_progress, ProgressStage::None, 100);

        info!(project_id = %project.id, "Published to pool");
        Ok(preview)
    }

    /// Publishes a project at a land placement.
    ///
    /// On success the new deployment replaces `override_deployment_id` in
    /// the registry.
    pub async fn deploy_to_land(
        &self,
        project_id: &str,
        placement: Placement,
        override_deployment_id: Option<&str>,
        on_progress: Option<ProgressCallback>,
    ) -> DeployResult<Deployment> {
        let deployment = self
            .deploy_scene(project_id, Target::Land(placement), on_progress)
            .await
            .map_err(|e| DeploymentFailure::new(FailureKey::Project(project_id.to_string()), e))?;
        self.deps
            .registry
            .insert(deployment.clone(), override_deployment_id);
        Ok(deployment)
    }

    /// Publishes a project to a named world.
    pub async fn deploy_to_world(
        &self,
        project_id: &str,
        world: &str,
        on_progress: Option<ProgressCallback>,
    ) -> DeployResult<Deployment> {
        let deployment = self
            .deploy_scene(project_id, Target::World(world), on_progress)
            .await
            .map_err(|e| DeploymentFailure::new(FailureKey::Project(project_id.to_string()), e))?;
        self.deps.registry.insert(deployment.clone(), None);
        Ok(deployment)
    }

    async fn deploy_scene(
        &self,
        project_id: &str,
        target: Target<'_>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Deployment, DeployError> {
        let store = &self.deps.store;
        let project = store
            .project(project_id)
            .ok_or(DeployError::InvalidProject)?;
        let scene = store
            .scene_for_project(&project.id)
            .ok_or(DeployError::InvalidScene)?;
        let identity = self
            .deps
            .identity
            .identity()
            .ok_or(DeployError::InvalidIdentity)?;
        let author = store.author_name();

        let scene = run_migrations(scene, &scene_ladder())?;
        let placement = target.placement();
        let world = target.world();
        info!(
            project_id = %project.id,
            base = %placement.point,
            world = ?world,
            "Deploying scene"
        );

        let thumbnail = self.upload_preview(&project, on_progress.clone()).await?;

        let options = CreateFilesOptions::new(&project, &scene, placement)
            .deploy()
            .with_author(author)
            .with_owner(Some(identity.address().to_string()))
            .with_thumbnail(thumbnail.clone())
            .with_world(world.clone())
            .with_progress(on_progress);

        let client = match target {
            Target::Land(_) => &self.deps.land,
            Target::World(_) => &self.deps.worlds,
        };
        let (entity_id, definition) = self
            .publish(client.as_ref(), &identity, options)
            .await?;

        info!(project_id = %project.id, entity_id = %entity_id, "Deployed scene");
        Ok(Deployment {
            id: entity_id,
            placement,
            owner: identity.address().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            layout: Some(project.layout),
            name: project.title.clone(),
            thumbnail,
            project_id: Some(project.id.clone()),
            base: definition.scene.base,
            parcels: definition.scene.parcels,
            world,
        })
    }

    /// Uploads stored preview media when signed in. Returns the preview URL.
    async fn upload_preview(
        &self,
        project: &Project,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Option<String>, DeployError> {
        if !self.deps.store.is_logged_in() {
            return Ok(None);
        }
        let Some(refs) = self.deps.media.media() else {
            warn!(project_id = %project.id, "Failed to upload scene preview");
            return Ok(None);
        };

        let media = load_media(self.deps.media.as_ref(), refs).await?;
        self.deps
            .builder
            .upload_media(project.id.clone(), media, on_progress)
            .await?;
        Ok(Some(self.deps.builder.preview_url(&project.id)))
    }

    /// Packages, signs and deploys. Returns the entity id and the scene
    /// definition that was published.
    async fn publish(
        &self,
        client: &dyn ContentClient,
        identity: &Identity,
        options: CreateFilesOptions<'_>,
    ) -> Result<(String, SceneDefinition), DeployError> {
        let files = create_files(options, self.deps.assets.as_ref()).await?;
        let content_files = make_content_files(&files);
        let definition = parse_scene_definition(&files)?;
        let metadata = serde_json::to_value(&definition).map_err(ContentError::from)?;

        let prepared = client.build_entity(
            EntityType::Scene,
            definition.scene.parcels.clone(),
            metadata,
            content_files,
        )?;
        let auth_chain = identity.sign_payload(&prepared.entity_id);
        client
            .deploy_entity(DeployEntityRequest {
                entity_id: prepared.entity_id.clone(),
                files: prepared.files,
                auth_chain,
            })
            .await?;
        Ok((prepared.entity_id, definition))
    }

    /// Un-publishes a known deployment by deploying an empty scene over it.
    ///
    /// Returns the cleared deployment id.
    pub async fn clear_deployment(&self, deployment_id: &str) -> DeployResult<String> {
        self.clear(deployment_id)
            .await
            .map_err(|e| DeploymentFailure::new(FailureKey::Deployment(deployment_id.to_string()), e))
    }

    async fn clear(&self, deployment_id: &str) -> Result<String, DeployError> {
        let deployment = self
            .deps
            .registry
            .get(deployment_id)
            .ok_or(DeployError::InvalidDeployment)?;
        let identity = self
            .deps
            .identity
            .identity()
            .ok_or(DeployError::InvalidIdentity)?;

        info!(deployment_id = %deployment_id, base = %deployment.base, "Clearing deployment");
        let project_id = deployment
            .project_id
            .as_deref()
            .unwrap_or(UNPUBLISHED_PROJECT_ID);
        let (project, scene): (Project, Scene) = empty_deployment(project_id, deployment.layout);
        let options = CreateFilesOptions::new(&project, &scene, deployment.placement)
            .deploy()
            .empty();

        let (entity_id, _) = self
            .publish(self.deps.land.as_ref(), &identity, options)
            .await?;

        self.deps.registry.remove(deployment_id);
        info!(deployment_id = %deployment_id, entity_id = %entity_id, "Cleared deployment");
        Ok(deployment_id.to_string())
    }

    /// Latest visible land deployments claiming any of `coords`.
    pub async fn fetch_deployments(&self, coords: &[String]) -> DeployResult<Vec<Deployment>> {
        if coords.is_empty() {
            return Ok(Vec::new());
        }
        let land = self.deps.land.as_ref();
        let entities = land
            .fetch_entities_by_pointers(coords.to_vec())
            .await
            .map_err(|e| DeploymentFailure::new(FailureKey::Coords(coords.to_vec()), e))?;

        let deployments =
            format_deployments(entities.clone(), DeploymentKey::FirstPointer, land.content_url());
        self.deps
            .registry
            .apply_entities(entities, DeploymentKey::FirstPointer, land.content_url());
        Ok(deployments)
    }

    /// Deployments of the named worlds. Worlds without an entity are skipped.
    pub async fn fetch_world_deployments(&self, worlds: &[String]) -> DeployResult<Vec<Deployment>> {
        let client = self.deps.worlds.as_ref();
        let mut entities = Vec::with_capacity(worlds.len());
        for world in worlds {
            let found = client
                .fetch_entities_by_pointers(vec![world.clone()])
                .await
                .map_err(|e| DeploymentFailure::new(FailureKey::Worlds(worlds.to_vec()), e))?;
            entities.extend(found.into_iter().next());
        }

        let deployments =
            format_deployments(entities.clone(), DeploymentKey::EntityId, client.content_url());
        self.deps
            .registry
            .apply_entities(entities, DeploymentKey::EntityId, client.content_url());
        Ok(deployments)
    }

    /// Deployments on the given parcels and estates.
    pub async fn fetch_land_deployments(
        &self,
        lands: &[LandSelection],
        estates: &EstateIndex,
    ) -> DeployResult<Vec<Deployment>> {
        let coords = coords_for_lands(lands, estates);
        self.fetch_deployments(&coords).await
    }
}
