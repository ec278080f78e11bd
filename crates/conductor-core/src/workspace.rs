//! The workspace port.
//!
//! The orchestrator never owns project metadata, raw bytes, or validation
//! semantics; it consumes them through this trait. Uses RPITIT for async
//! methods. The concrete file-backed implementation lives in
//! `conductor-infra`; tests use in-memory fakes.

use std::future::Future;
use std::path::Path;

use serde_json::Value;

use conductor_types::error::ConductorError;
use conductor_types::project::Project;

/// Capabilities the orchestrator consumes from its host workspace.
///
/// The workspace also carries the raw read capability that builders receive
/// through their execution context; the core never mutates the workspace.
pub trait Workspace: Send + Sync + 'static {
    /// Names of all projects in the workspace.
    fn project_names(&self) -> Vec<String>;

    /// Metadata for a single project. Fails with
    /// [`ConductorError::ProjectNotFound`] for unknown names.
    fn project(&self, name: &str) -> Result<Project, ConductorError>;

    /// The raw, unvalidated target map of a project.
    fn project_targets(&self, name: &str) -> Result<Value, ConductorError>;

    /// Validate `value` against `schema`, returning the validated value.
    ///
    /// The returned value may differ from the input (defaults applied,
    /// types coerced) per the validator's semantics. Fails with
    /// [`ConductorError::SchemaValidation`] carrying the schema identity
    /// and the failing input.
    fn validate(
        &self,
        value: Value,
        schema: &Value,
    ) -> impl Future<Output = Result<Value, ConductorError>> + Send;

    /// Read the raw bytes at `path`.
    fn read(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>, ConductorError>> + Send;

    /// The workspace root location.
    fn root(&self) -> &Path;
}
