//! Empty project and scene used to tombstone a placement.

use crate::coord::Layout;
use crate::scene::{OrderedMap, Scene};

use super::Project;

/// Project id used when clearing a deployment with no known project.
pub const UNPUBLISHED_PROJECT_ID: &str = "unpublished-project";

/// Title given to tombstone projects.
pub const EMPTY_SCENE_TITLE: &str = "Empty Scene";

const EPOCH: &str = "1970-01-01T00:00:00.000Z";

/// Builds the project/scene pair deployed when un-publishing.
///
/// The result is deterministic for a given id and layout: it carries no
/// entities, an empty asset catalog, and the layout of the deployment being
/// cleared so that every parcel it occupied is covered.
pub fn empty_deployment(project_id: &str, layout: Option<Layout>) -> (Project, Scene) {
    let scene_id = format!("{}-empty", project_id);

    let mut scene = Scene::new(scene_id.clone());
    scene.assets = Some(OrderedMap::new());

    let mut project = Project::new(project_id, EMPTY_SCENE_TITLE, layout.unwrap_or_default())
        .with_scene_id(scene_id);
    project.created_at = EPOCH.to_string();
    project.updated_at = EPOCH.to_string();

    (project, scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_deployment_is_deterministic() {
        let a = empty_deployment("p1", None);
        let b = empty_deployment("p1", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_deployment_shape() {
        let (project, scene) = empty_deployment(UNPUBLISHED_PROJECT_ID, Some(Layout::new(2, 2)));
        assert_eq!(project.id, "unpublished-project");
        assert_eq!(project.layout, Layout::new(2, 2));
        assert_eq!(project.scene_id, scene.id);
        assert!(scene.entities.is_empty());
        assert!(scene.components.is_empty());
    }
}
