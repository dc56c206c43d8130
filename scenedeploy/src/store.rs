//! Editor state read by the deployment flows.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::project::Project;
use crate::scene::Scene;

/// Read access to projects, scenes and session data.
pub trait ProjectStore: Send + Sync {
    fn project(&self, project_id: &str) -> Option<Project>;

    /// The project open in the editor, if any.
    fn current_project(&self) -> Option<Project>;

    fn scene_for_project(&self, project_id: &str) -> Option<Scene>;

    /// Display name of the signed-in user.
    fn author_name(&self) -> Option<String>;

    fn is_logged_in(&self) -> bool;
}

#[derive(Debug, Default)]
struct StoreState {
    projects: HashMap<String, Project>,
    scenes: HashMap<String, Scene>,
    current: Option<String>,
    author: Option<String>,
    logged_in: bool,
}

/// [`ProjectStore`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    state: RwLock<StoreState>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project and its scene, keyed by the project's scene id.
    pub fn insert(&self, project: Project, scene: Scene) {
        let mut state = self.state.write();
        state.scenes.insert(project.scene_id.clone(), scene);
        state.projects.insert(project.id.clone(), project);
    }

    pub fn set_current(&self, project_id: Option<&str>) {
        self.state.write().current = project_id.map(String::from);
    }

    pub fn set_author(&self, author: Option<String>) {
        self.state.write().author = author;
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.state.write().logged_in = logged_in;
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn project(&self, project_id: &str) -> Option<Project> {
        self.state.read().projects.get(project_id).cloned()
    }

    fn current_project(&self) -> Option<Project> {
        let state = self.state.read();
        let id = state.current.as_ref()?;
        state.projects.get(id).cloned()
    }

    fn scene_for_project(&self, project_id: &str) -> Option<Scene> {
        let state = self.state.read();
        let project = state.projects.get(project_id)?;
        state.scenes.get(&project.scene_id).cloned()
    }

    fn author_name(&self) -> Option<String> {
        self.state.read().author.clone()
    }

    fn is_logged_in(&self) -> bool {
        self.state.read().logged_in
    }
}
