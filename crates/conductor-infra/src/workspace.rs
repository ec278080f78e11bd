//! File-backed workspace.
//!
//! Loads a workspace manifest (`workspace.json`, loose JSON dialect) of
//! shape `{ "projects": { <name>: { root, projectType, targets } } }`,
//! serves project metadata and raw target maps from it, reads files with
//! tokio, and validates through the JSON-Schema gateway.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use conductor_core::workspace::Workspace;
use conductor_types::error::ConductorError;
use conductor_types::project::Project;

use crate::validator;

/// One project declaration inside the workspace manifest.
#[derive(Debug, Clone, Deserialize)]
struct ProjectDecl {
    /// Project root, relative to the workspace root.
    root: PathBuf,
    #[serde(rename = "projectType")]
    project_type: String,
    /// The raw target map, validated later by the orchestrator.
    #[serde(default = "empty_target_map")]
    targets: Value,
}

fn empty_target_map() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Deserialize)]
struct WorkspaceFile {
    projects: HashMap<String, ProjectDecl>,
}

/// A workspace rooted at the directory containing its manifest file.
pub struct FileWorkspace {
    root: PathBuf,
    projects: HashMap<String, ProjectDecl>,
}

impl FileWorkspace {
    /// Load a workspace from its manifest file.
    pub async fn load(path: &Path) -> Result<Self, ConductorError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|error| ConductorError::ResourceRead {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
        let text = String::from_utf8(bytes).map_err(|error| ConductorError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let file: WorkspaceFile = json5::from_str(&text).map_err(|error| ConductorError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        tracing::debug!(root = %root.display(), projects = file.projects.len(), "workspace loaded");
        Ok(Self {
            root,
            projects: file.projects,
        })
    }
}

impl Workspace for FileWorkspace {
    fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    fn project(&self, name: &str) -> Result<Project, ConductorError> {
        let decl = self
            .projects
            .get(name)
            .ok_or_else(|| ConductorError::ProjectNotFound(name.to_string()))?;
        Ok(Project {
            name: name.to_string(),
            root: self.root.join(&decl.root),
            project_type: decl.project_type.clone(),
        })
    }

    fn project_targets(&self, name: &str) -> Result<Value, ConductorError> {
        self.projects
            .get(name)
            .map(|decl| decl.targets.clone())
            .ok_or_else(|| ConductorError::ProjectNotFound(name.to_string()))
    }

    async fn validate(&self, value: Value, schema: &Value) -> Result<Value, ConductorError> {
        validator::validate_against_schema(value, schema)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, ConductorError> {
        tokio::fs::read(path)
            .await
            .map_err(|error| ConductorError::ResourceRead {
                path: path.to_path_buf(),
                message: error.to_string(),
            })
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
