//! Injected resolution capabilities.
//!
//! Package lookup and implementation-module loading are external concerns:
//! the orchestrator consumes them through these object-safe traits (boxed
//! futures, so they can live behind `Arc<dyn ...>`). Concrete
//! implementations live in `conductor-infra`; tests use in-memory fakes.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use conductor_types::error::ConductorError;

use crate::builder::BuilderFactory;
use crate::workspace::Workspace;

/// Locates a package's manifest on behalf of the builder resolver.
pub trait PackageResolver: Send + Sync {
    /// Resolve `package`'s manifest location, searching from `base` upward
    /// through ancestor directories the way dependency resolution
    /// conventionally works.
    fn resolve_manifest<'a>(
        &'a self,
        package: &'a str,
        base: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf, ConductorError>> + Send + 'a>>;
}

/// Loads a builder implementation module and yields its factory export.
pub trait BuilderLoader<W: Workspace>: Send + Sync {
    /// Load the module at `module` and extract the expected export.
    fn load<'a>(
        &'a self,
        module: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn BuilderFactory<W>>, ConductorError>> + Send + 'a>>;
}
