//! The orchestrator: schema loading, target lookup, builder resolution,
//! and the run pipeline.
//!
//! A `Conductor` owns four independently keyed caches (validated target
//! maps, resolved builder paths, builder descriptions, builder factories).
//! All caches are append-only for the orchestrator's lifetime -- the
//! process is assumed to be one bounded build invocation, not a
//! long-running server. Cloning a `Conductor` clones a handle to the same
//! caches; separate `Conductor` values share nothing.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future;
use serde_json::Value;
use tokio::sync::OnceCell;

use conductor_types::builder::{
    BuilderDescription, BuilderId, BuilderPaths, PackageManifest, PluginManifest,
};
use conductor_types::error::ConductorError;
use conductor_types::target::{BuilderConfiguration, Target, TargetMap, TargetSpecifier};

use crate::builder::{BuildEventStream, Builder, BuilderFactory};
use crate::context::{ExecutionContext, PartialContext};
use crate::document::{self, schema_identity};
use crate::resolve::{BuilderLoader, PackageResolver};
use crate::workspace::Workspace;

/// The targets schema document, committed alongside the crate.
const TARGETS_SCHEMA: &str = include_str!("../schemas/targets.schema.json");
/// The builders (plugin manifest) schema document.
const BUILDERS_SCHEMA: &str = include_str!("../schemas/builders.schema.json");

/// State produced by one-time initialization: the parsed builders schema
/// and every project's validated target map. Immutable once built.
struct Loaded {
    builders_schema: Value,
    target_maps: HashMap<String, TargetMap>,
}

struct Inner<W: Workspace> {
    workspace: Arc<W>,
    resolver: Arc<dyn PackageResolver>,
    loader: Arc<dyn BuilderLoader<W>>,
    loaded: OnceCell<Loaded>,
    builder_paths: DashMap<String, BuilderPaths>,
    descriptions: DashMap<String, BuilderDescription>,
    factories: DashMap<String, Arc<dyn BuilderFactory<W>>>,
}

/// The orchestrator.
///
/// Resolution caches are lazy and unguarded: two overlapping cold-path
/// resolutions of the same builder identifier may compute twice before
/// either result is cached. Initialization itself is single-flight.
pub struct Conductor<W: Workspace> {
    inner: Arc<Inner<W>>,
}

impl<W: Workspace> Clone for Conductor<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Workspace> Conductor<W> {
    pub fn new(
        workspace: Arc<W>,
        resolver: Arc<dyn PackageResolver>,
        loader: Arc<dyn BuilderLoader<W>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                workspace,
                resolver,
                loader,
                loaded: OnceCell::new(),
                builder_paths: DashMap::new(),
                descriptions: DashMap::new(),
                factories: DashMap::new(),
            }),
        }
    }

    /// The workspace this orchestrator serves.
    pub fn workspace(&self) -> &Arc<W> {
        &self.inner.workspace
    }

    /// One-time initialization: parse the committed schema documents and
    /// validate every project's target map against the targets schema.
    ///
    /// Idempotent -- a second call when already loaded is a cheap no-op
    /// performing no additional I/O. If any project's target map fails
    /// validation, initialization as a whole fails; there is no
    /// partial-success mode.
    pub async fn load(&self) -> Result<&Self, ConductorError> {
        self.inner.loaded.get_or_try_init(|| self.load_all()).await?;
        Ok(self)
    }

    async fn load_all(&self) -> Result<Loaded, ConductorError> {
        let targets_schema =
            document::parse_document(TARGETS_SCHEMA, Path::new("schemas/targets.schema.json"))?;
        let builders_schema =
            document::parse_document(BUILDERS_SCHEMA, Path::new("schemas/builders.schema.json"))?;

        // Validate all project target maps concurrently; the first failure
        // aborts initialization.
        let workspace = &self.inner.workspace;
        let names = workspace.project_names();
        tracing::debug!(projects = names.len(), "validating project target maps");
        let validated = future::try_join_all(names.into_iter().map(|name| {
            let schema = &targets_schema;
            async move {
                let raw = workspace.project_targets(&name)?;
                let validated = workspace.validate(raw, schema).await?;
                let map: TargetMap =
                    serde_json::from_value(validated.clone()).map_err(|error| {
                        ConductorError::SchemaValidation {
                            schema: schema_identity(schema),
                            message: error.to_string(),
                            value: validated,
                        }
                    })?;
                Ok::<_, ConductorError>((name, map))
            }
        }))
        .await?;

        Ok(Loaded {
            builders_schema,
            target_maps: validated.into_iter().collect(),
        })
    }

    fn loaded(&self) -> Result<&Loaded, ConductorError> {
        self.inner.loaded.get().ok_or(ConductorError::NotLoaded)
    }

    /// Target names declared by a project.
    pub fn list_project_targets(&self, project: &str) -> Result<Vec<String>, ConductorError> {
        let mut names: Vec<String> = self.project_target_map(project)?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn project_target_map(&self, project: &str) -> Result<&TargetMap, ConductorError> {
        self.inner
            .loaded
            .get()
            .and_then(|loaded| loaded.target_maps.get(project))
            .ok_or_else(|| ConductorError::ProjectNotFound(project.to_string()))
    }

    fn project_target(&self, project: &str, target: &str) -> Result<&Target, ConductorError> {
        self.project_target_map(project)?
            .get(target)
            .ok_or_else(|| ConductorError::TargetNotFound {
                project: project.to_string(),
                target: target.to_string(),
            })
    }

    /// Merge a target specifier into a runnable configuration.
    ///
    /// Pure and synchronous: options are `base ⊕ named-configuration
    /// overrides ⊕ caller overrides`, later keys winning, shallow merge
    /// only. The cached target is never mutated.
    pub fn builder_configuration(
        &self,
        spec: &TargetSpecifier,
    ) -> Result<BuilderConfiguration, ConductorError> {
        let project = self.inner.workspace.project(&spec.project)?;
        let target = self.project_target(&spec.project, &spec.target)?;

        let mut options = target.options.clone();
        if let Some(configuration_name) = &spec.configuration {
            let configuration = target
                .configurations
                .as_ref()
                .and_then(|configurations| configurations.get(configuration_name))
                .ok_or_else(|| ConductorError::ConfigurationNotFound {
                    project: spec.project.clone(),
                    configuration: configuration_name.clone(),
                })?;
            for (key, value) in configuration {
                options.insert(key.clone(), value.clone());
            }
        }
        if let Some(overrides) = &spec.overrides {
            for (key, value) in overrides {
                options.insert(key.clone(), value.clone());
            }
        }

        Ok(BuilderConfiguration {
            root: project.root,
            project_type: project.project_type,
            builder: target.builder.clone(),
            options,
        })
    }

    /// Run the builder named by `config`, returning its event stream.
    ///
    /// Stages: context assembly, description resolution, option
    /// validation, instantiation, execution. Failure at any stage before
    /// execution short-circuits with that stage's error and the builder is
    /// never instantiated; failure during execution travels inside the
    /// returned stream, forwarded as-is.
    pub async fn run(
        &self,
        config: BuilderConfiguration,
        partial: PartialContext<W>,
    ) -> Result<BuildEventStream, ConductorError> {
        let context = ExecutionContext {
            logger: partial.logger.unwrap_or_else(tracing::Span::none),
            conductor: self.clone(),
            workspace: partial
                .workspace
                .unwrap_or_else(|| Arc::clone(&self.inner.workspace)),
        };

        let description = self.builder_description(&config).await?;
        let config = self.validate_builder_options(config, &description).await?;
        let builder = self.builder(&description, context).await?;
        Ok(builder.run(config))
    }

    /// Resolve (and cache) the description of `config`'s builder.
    ///
    /// Cold path: package manifest -> plugin manifest (validated against
    /// the builders schema) -> entry for the builder name -> option
    /// schema. Each cache is populated only after total success of its
    /// layer, so a failed resolution leaves a retry unaffected.
    pub async fn builder_description(
        &self,
        config: &BuilderConfiguration,
    ) -> Result<BuilderDescription, ConductorError> {
        if let Some(entry) = self.inner.descriptions.get(&config.builder) {
            return Ok(entry.value().clone());
        }

        let loaded = self.loaded()?;
        let id: BuilderId = config.builder.parse()?;
        let workspace = self.inner.workspace.as_ref();
        tracing::debug!(builder = %id, "resolving builder");

        let manifest_path = self
            .inner
            .resolver
            .resolve_manifest(&id.package, workspace.root())
            .await?;
        let manifest_doc = document::load_document(workspace, &manifest_path).await?;
        let manifest: PackageManifest =
            serde_json::from_value(manifest_doc).map_err(|error| ConductorError::Parse {
                path: manifest_path.clone(),
                message: error.to_string(),
            })?;
        let pointer = manifest
            .builders
            .ok_or_else(|| ConductorError::BuilderCannotBeResolved(config.builder.clone()))?;

        let manifest_dir = parent_dir(&manifest_path);
        let plugin_path = resolve_relative(manifest_dir, &pointer);
        let plugin_doc = document::load_document(workspace, &plugin_path).await?;
        let plugin_doc = workspace
            .validate(plugin_doc, &loaded.builders_schema)
            .await?;
        let plugin: PluginManifest =
            serde_json::from_value(plugin_doc).map_err(|error| ConductorError::Parse {
                path: plugin_path.clone(),
                message: error.to_string(),
            })?;
        let entry = plugin
            .builders
            .get(&id.name)
            .ok_or_else(|| ConductorError::BuilderCannotBeResolved(config.builder.clone()))?;

        let plugin_dir = parent_dir(&plugin_path);
        let paths = BuilderPaths {
            schema: resolve_relative(plugin_dir, &entry.schema),
            implementation: resolve_relative(plugin_dir, &entry.implementation),
            description: entry.description.clone(),
        };
        // The paths cache feeds lazy factory loading; it stays independent
        // of the description cache.
        self.inner
            .builder_paths
            .insert(config.builder.clone(), paths.clone());

        let schema = document::load_document(workspace, &paths.schema).await?;
        let description = BuilderDescription {
            id,
            schema,
            description: paths.description,
        };
        self.inner
            .descriptions
            .insert(config.builder.clone(), description.clone());
        Ok(description)
    }

    /// Validate `config.options` against the builder's option schema,
    /// replacing the option set with the validated/coerced result.
    pub async fn validate_builder_options(
        &self,
        mut config: BuilderConfiguration,
        description: &BuilderDescription,
    ) -> Result<BuilderConfiguration, ConductorError> {
        let validated = self
            .inner
            .workspace
            .validate(Value::Object(config.options), &description.schema)
            .await?;
        config.options = match validated {
            Value::Object(options) => options,
            other => {
                return Err(ConductorError::SchemaValidation {
                    schema: schema_identity(&description.schema),
                    message: "validator returned a non-object option set".to_string(),
                    value: other,
                });
            }
        };
        Ok(config)
    }

    /// Construct a fresh builder instance for `description`.
    ///
    /// The factory is cached per builder identifier; loading it requires
    /// previously resolved builder paths. The paths check is defensive:
    /// the description and factory caches are independently keyed.
    pub async fn builder(
        &self,
        description: &BuilderDescription,
        context: ExecutionContext<W>,
    ) -> Result<Box<dyn Builder>, ConductorError> {
        let key = description.id.to_string();
        let cached = self
            .inner
            .factories
            .get(&key)
            .map(|entry| Arc::clone(entry.value()));
        let factory = match cached {
            Some(factory) => factory,
            None => {
                let paths = match self.inner.builder_paths.get(&key) {
                    Some(entry) => entry.value().clone(),
                    None => return Err(ConductorError::BuilderNotFound(key)),
                };
                tracing::debug!(
                    builder = %key,
                    module = %paths.implementation.display(),
                    "loading builder module"
                );
                let factory = self.inner.loader.load(&paths.implementation).await?;
                self.inner.factories.insert(key, Arc::clone(&factory));
                factory
            }
        };
        Ok(factory.create(context))
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Join `relative` onto `base`, folding `.` and `..` components so cache
/// keys and read locations stay in canonical form without touching the
/// filesystem.
fn resolve_relative(base: &Path, relative: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
