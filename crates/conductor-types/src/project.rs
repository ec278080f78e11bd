//! Project metadata.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named unit of source owning one or more targets.
///
/// Projects are owned by the workspace and immutable for the orchestrator's
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// The project's name, unique within its workspace.
    pub name: String,
    /// Root location of the project's sources.
    pub root: PathBuf,
    /// Project-type tag (e.g. "application", "library").
    #[serde(rename = "projectType")]
    pub project_type: String,
}
