//! Command handlers for the conductor CLI.

pub mod run;
pub mod targets;

use std::path::Path;
use std::sync::Arc;

use conductor_core::Conductor;
use conductor_infra::{DirPackageResolver, FileWorkspace, RegistryLoader, ShellBuilderFactory};

/// Build and initialize an orchestrator over the workspace manifest at
/// `workspace`, with the built-in builder exports registered.
pub(crate) async fn conductor(workspace: &Path) -> anyhow::Result<Conductor<FileWorkspace>> {
    let workspace = Arc::new(FileWorkspace::load(workspace).await?);
    let loader = RegistryLoader::new();
    loader.register("shell", Arc::new(ShellBuilderFactory));
    let conductor = Conductor::new(
        workspace,
        Arc::new(DirPackageResolver::new()),
        Arc::new(loader),
    );
    conductor.load().await?;
    Ok(conductor)
}
