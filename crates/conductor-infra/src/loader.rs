//! Registry-backed builder module loading.
//!
//! A builder entry's `class` location points at a module descriptor: a
//! small JSON document `{ "builder": "<export>" }` naming the factory
//! export. Loading reads the descriptor (real I/O, so a stale manifest
//! fails the same way a missing module would) and maps the export name
//! onto a registry of compiled-in factories.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;

use conductor_core::builder::BuilderFactory;
use conductor_core::resolve::BuilderLoader;
use conductor_core::workspace::Workspace;
use conductor_types::builder::ModuleDescriptor;
use conductor_types::error::ConductorError;

/// Maps module-descriptor export names to registered factories.
pub struct RegistryLoader<W: Workspace> {
    factories: DashMap<String, Arc<dyn BuilderFactory<W>>>,
}

impl<W: Workspace> RegistryLoader<W> {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Register a factory under an export name.
    pub fn register(&self, export: impl Into<String>, factory: Arc<dyn BuilderFactory<W>>) {
        self.factories.insert(export.into(), factory);
    }
}

impl<W: Workspace> Default for RegistryLoader<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Workspace> BuilderLoader<W> for RegistryLoader<W> {
    fn load<'a>(
        &'a self,
        module: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn BuilderFactory<W>>, ConductorError>> + Send + 'a>>
    {
        Box::pin(async move {
            let bytes =
                tokio::fs::read(module)
                    .await
                    .map_err(|error| ConductorError::ResourceRead {
                        path: module.to_path_buf(),
                        message: error.to_string(),
                    })?;
            let text = String::from_utf8(bytes).map_err(|error| ConductorError::Parse {
                path: module.to_path_buf(),
                message: error.to_string(),
            })?;
            let descriptor: ModuleDescriptor =
                json5::from_str(&text).map_err(|error| ConductorError::Parse {
                    path: module.to_path_buf(),
                    message: error.to_string(),
                })?;
            self.factories
                .get(&descriptor.builder)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or_else(|| ConductorError::BuilderNotFound(descriptor.builder.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use conductor_core::builder::{BuildEventStream, Builder};
    use conductor_core::context::ExecutionContext;
    use conductor_types::event::BuildEvent;
    use conductor_types::target::BuilderConfiguration;

    use crate::workspace::FileWorkspace;

    struct NoopFactory;

    impl BuilderFactory<FileWorkspace> for NoopFactory {
        fn create(&self, _context: ExecutionContext<FileWorkspace>) -> Box<dyn Builder> {
            Box::new(NoopBuilder)
        }
    }

    struct NoopBuilder;

    impl Builder for NoopBuilder {
        fn run(&self, _config: BuilderConfiguration) -> BuildEventStream {
            Box::pin(futures_util::stream::iter([Ok(BuildEvent::success())]))
        }
    }

    #[tokio::test]
    async fn loads_a_registered_export() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("noop.builder");
        std::fs::write(&module, r#"{ "builder": "noop" }"#).unwrap();

        let loader = RegistryLoader::<FileWorkspace>::new();
        loader.register("noop", Arc::new(NoopFactory));

        assert!(loader.load(&module).await.is_ok());
    }

    #[tokio::test]
    async fn unregistered_export_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("ghost.builder");
        std::fs::write(&module, r#"{ "builder": "ghost" }"#).unwrap();

        let loader = RegistryLoader::<FileWorkspace>::new();
        let err = loader.load(&module).await.err().unwrap();
        assert!(matches!(
            err,
            ConductorError::BuilderNotFound(export) if export == "ghost"
        ));
    }

    #[tokio::test]
    async fn missing_module_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RegistryLoader::<FileWorkspace>::new();
        let err = loader
            .load(&dir.path().join("absent.builder"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ConductorError::ResourceRead { .. }));
    }

    #[tokio::test]
    async fn malformed_descriptor_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("broken.builder");
        std::fs::write(&module, "not a descriptor").unwrap();

        let loader = RegistryLoader::<FileWorkspace>::new();
        let err = loader.load(&module).await.err().unwrap();
        assert!(matches!(err, ConductorError::Parse { .. }));
    }
}
