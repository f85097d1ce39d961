//! Resolving a project name to the graph a session should run.

use crate::error::SourceError;
use crate::flow::{EditorGraph, FlowDefinition, IntoFlow};
use ahash::AHashMap;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Resolves `project` to exactly one graph definition.
    async fn resolve(&self, project: &str) -> Result<FlowDefinition, SourceError>;
}

/// Serves `<root>/<project>.json` editor exports, or `<root>/<project>.bin`
/// snapshots when no JSON file exists.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn validate(project: &str) -> Result<(), SourceError> {
        let invalid = project.is_empty()
            || project.contains(['/', '\\'])
            || project.contains("..")
            || project.starts_with('.');
        if invalid {
            Err(SourceError::InvalidName(project.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GraphSource for DirectorySource {
    async fn resolve(&self, project: &str) -> Result<FlowDefinition, SourceError> {
        Self::validate(project)?;

        let json_path = self.root.join(format!("{}.json", project));
        match tokio::fs::read_to_string(&json_path).await {
            Ok(content) => {
                debug!(path = %json_path.display(), "loading editor graph");
                return Ok(EditorGraph::from_json(&content)?.into_flow()?);
            }
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(SourceError::Io {
                    project: project.to_string(),
                    message: e.to_string(),
                });
            }
            Err(_) => {}
        }

        let snapshot_path = self.root.join(format!("{}.bin", project));
        match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => {
                debug!(path = %snapshot_path.display(), "loading graph snapshot");
                Ok(FlowDefinition::from_bytes(&bytes)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(project.to_string()))
            }
            Err(e) => Err(SourceError::Io {
                project: project.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Graphs held in memory, keyed by project name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    projects: AHashMap<String, FlowDefinition>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, project: impl Into<String>, definition: FlowDefinition) {
        self.projects.insert(project.into(), definition);
    }

    pub fn with_project(mut self, project: impl Into<String>, definition: FlowDefinition) -> Self {
        self.insert(project, definition);
        self
    }
}

#[async_trait]
impl GraphSource for MemorySource {
    async fn resolve(&self, project: &str) -> Result<FlowDefinition, SourceError> {
        self.projects
            .get(project)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(project.to_string()))
    }
}
