//! Deployment orchestration and the deployment index.
//!
//! The [`DeploymentOrchestrator`] runs the publishing flows:
//!
//! - pool publishing (capture handshake, media upload, pool submission)
//! - land and world publishing (package, hash, sign, deploy)
//! - clearing a deployment by publishing an empty scene over it
//! - fetching deployments by parcel, land selection or world name
//!
//! Fetched and published deployments are kept in a shared
//! [`DeploymentRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use scenedeploy::deployment::{Collaborators, DeploymentOrchestrator};
//!
//! let orchestrator = DeploymentOrchestrator::new(collaborators);
//! let deployment = orchestrator
//!     .deploy_to_land("project-1", placement, None, Some(on_progress))
//!     .await?;
//! println!("Published {}", deployment.id);
//! ```

mod error;
mod orchestrator;
mod reduce;
mod registry;
mod types;

pub use error::{first_line, DeployError, DeployResult, DeploymentFailure, FailureKey};
pub use orchestrator::{Collaborators, DeploymentOrchestrator};
pub use reduce::{
    format_deployments, format_for_client, reduce_entities, thumbnail_url, DeploymentKey, Reduced,
    UNTITLED_SCENE,
};
pub use registry::DeploymentRegistry;
pub use types::Deployment;
