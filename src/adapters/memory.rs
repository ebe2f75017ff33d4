use crate::core::{Image, ProjectInfo, ProjectStore};
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// Project store over an in-memory set of project graphs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    projects: BTreeMap<String, ProjectInfo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: ProjectInfo) -> Self {
        self.insert(project);
        self
    }

    pub fn insert(&mut self, project: ProjectInfo) {
        self.projects.insert(project.name.clone(), project);
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }
}

impl FromIterator<ProjectInfo> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = ProjectInfo>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for project in iter {
            store.insert(project);
        }
        store
    }
}

impl ProjectStore for MemoryStore {
    fn load_project(&self, name: &str, skip_if_no_limits: bool) -> Result<Option<ProjectInfo>> {
        let Some(project) = self.projects.get(name) else {
            return Ok(None);
        };

        if skip_if_no_limits && !project.has_limits() {
            tracing::debug!("Project '{}' has no limits, skipping", name);
            return Ok(None);
        }

        // 映像檔由 project_images 另外提供
        Ok(Some(ProjectInfo {
            images: Vec::new(),
            ..project.clone()
        }))
    }

    fn project_images(&self, name: &str) -> Result<Vec<Image>> {
        Ok(self
            .projects
            .get(name)
            .map(|project| project.images.clone())
            .unwrap_or_default())
    }
}
