//! Upward-searching package resolution.
//!
//! Builder packages live under a `packages/` directory. Resolution checks
//! the base directory first, then each ancestor, the way dependency
//! resolution conventionally searches upward -- so a nested project can
//! still reach packages installed at the workspace root or above it.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use conductor_core::resolve::PackageResolver;
use conductor_types::error::ConductorError;

/// The package manifest filename expected inside each package directory.
const PACKAGE_MANIFEST: &str = "manifest.json";

/// Resolves `<dir>/<packages_dir>/<package>/manifest.json` from a base
/// directory upward.
pub struct DirPackageResolver {
    packages_dir: String,
}

impl DirPackageResolver {
    pub fn new() -> Self {
        Self {
            packages_dir: "packages".to_string(),
        }
    }

    /// Use a packages directory name other than `packages`.
    pub fn with_packages_dir(packages_dir: impl Into<String>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
        }
    }
}

impl Default for DirPackageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageResolver for DirPackageResolver {
    fn resolve_manifest<'a>(
        &'a self,
        package: &'a str,
        base: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf, ConductorError>> + Send + 'a>> {
        Box::pin(async move {
            let mut dir = Some(base);
            while let Some(current) = dir {
                let candidate = current
                    .join(&self.packages_dir)
                    .join(package)
                    .join(PACKAGE_MANIFEST);
                if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                    tracing::debug!(package, manifest = %candidate.display(), "package resolved");
                    return Ok(candidate);
                }
                dir = current.parent();
            }
            Err(ConductorError::BuilderCannotBeResolved(package.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_package(root: &Path, name: &str) -> PathBuf {
        let dir = root.join("packages").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = dir.join(PACKAGE_MANIFEST);
        std::fs::write(&manifest, r#"{ "builders": "./builders.json" }"#).unwrap();
        manifest
    }

    #[tokio::test]
    async fn resolves_a_package_in_the_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = install_package(dir.path(), "my-pkg");

        let resolver = DirPackageResolver::new();
        let resolved = resolver.resolve_manifest("my-pkg", dir.path()).await.unwrap();
        assert_eq!(resolved, manifest);
    }

    #[tokio::test]
    async fn searches_upward_through_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = install_package(dir.path(), "my-pkg");
        let nested = dir.path().join("apps/app");
        std::fs::create_dir_all(&nested).unwrap();

        let resolver = DirPackageResolver::new();
        let resolved = resolver.resolve_manifest("my-pkg", &nested).await.unwrap();
        assert_eq!(resolved, manifest);
    }

    #[tokio::test]
    async fn unknown_package_cannot_be_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirPackageResolver::new();
        let err = resolver
            .resolve_manifest("ghost-pkg", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConductorError::BuilderCannotBeResolved(package) if package == "ghost-pkg"
        ));
    }

    #[tokio::test]
    async fn honors_a_custom_packages_directory() {
        let dir = tempfile::tempdir().unwrap();
        let pkg_dir = dir.path().join("vendor/my-pkg");
        std::fs::create_dir_all(&pkg_dir).unwrap();
        std::fs::write(pkg_dir.join(PACKAGE_MANIFEST), "{}").unwrap();

        let resolver = DirPackageResolver::with_packages_dir("vendor");
        let resolved = resolver.resolve_manifest("my-pkg", dir.path()).await.unwrap();
        assert_eq!(resolved, pkg_dir.join(PACKAGE_MANIFEST));
    }
}
