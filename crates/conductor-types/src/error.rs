//! Error taxonomy for orchestration.

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the orchestrator and its collaborators.
///
/// All variants are non-retriable at this layer; retries, if any, are the
/// caller's or the builder's responsibility. Every stage fails fast and
/// aborts the remainder of its pipeline.
#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("project '{0}' could not be found in workspace")]
    ProjectNotFound(String),

    #[error("target '{target}' could not be found in project '{project}'")]
    TargetNotFound { project: String, target: String },

    #[error("configuration '{configuration}' could not be found in project '{project}'")]
    ConfigurationNotFound {
        project: String,
        configuration: String,
    },

    #[error("builder '{0}' cannot be resolved")]
    BuilderCannotBeResolved(String),

    #[error("builder '{0}' could not be found")]
    BuilderNotFound(String),

    #[error("conductor must be loaded before it is used")]
    NotLoaded,

    #[error("value failed validation against schema '{schema}': {message}")]
    SchemaValidation {
        /// Identity of the originating schema (`$id` or title).
        schema: String,
        message: String,
        /// The input that failed.
        value: Value,
    },

    #[error("failed to read '{path}': {message}")]
    ResourceRead { path: PathBuf, message: String },

    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// A failure produced by a builder's own run.
///
/// Forwarded verbatim inside the event stream; the orchestrator never
/// interprets or wraps it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BuildError(String);

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
