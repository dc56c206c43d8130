//! Project documents.
//!
//! A project wraps a scene with a title, a parcel layout and ownership
//! data. This module also synthesizes the empty project/scene pair that is
//! deployed to un-publish a placement.

mod empty;
mod types;

pub use empty::{empty_deployment, EMPTY_SCENE_TITLE, UNPUBLISHED_PROJECT_ID};
pub use types::Project;
