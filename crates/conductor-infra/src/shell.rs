//! Shell-command builder.
//!
//! A minimal real builder: options name a command, its arguments, and an
//! optional working directory relative to the project root. The run emits
//! a start event, spawns the process with tokio, and finishes with an
//! event carrying the exit status.

use serde_json::{Value, json};

use conductor_core::builder::{BuildEventStream, Builder, BuilderFactory};
use conductor_core::context::ExecutionContext;
use conductor_core::workspace::Workspace;
use conductor_types::error::BuildError;
use conductor_types::event::BuildEvent;
use conductor_types::target::BuilderConfiguration;

/// Factory for [`ShellBuilder`]; registered under the `shell` export.
pub struct ShellBuilderFactory;

impl<W: Workspace> BuilderFactory<W> for ShellBuilderFactory {
    fn create(&self, context: ExecutionContext<W>) -> Box<dyn Builder> {
        Box::new(ShellBuilder {
            logger: context.logger,
        })
    }
}

/// Runs one shell command per build.
pub struct ShellBuilder {
    logger: tracing::Span,
}

impl Builder for ShellBuilder {
    fn run(&self, config: BuilderConfiguration) -> BuildEventStream {
        let logger = self.logger.clone();
        Box::pin(async_stream::stream! {
            let command = match config.options.get("command").and_then(Value::as_str) {
                Some(command) => command.to_string(),
                None => {
                    yield Err(BuildError::new("shell builder requires a 'command' option"));
                    return;
                }
            };
            let args: Vec<String> = config
                .options
                .get("args")
                .and_then(Value::as_array)
                .map(|args| {
                    args.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let cwd = match config.options.get("cwd").and_then(Value::as_str) {
                Some(cwd) => config.root.join(cwd),
                None => config.root.clone(),
            };

            tracing::info!(parent: &logger, command = %command, cwd = %cwd.display(), "spawning");
            yield Ok(BuildEvent::success()
                .with_detail(json!({ "state": "started", "command": command })));

            match tokio::process::Command::new(&command)
                .args(&args)
                .current_dir(&cwd)
                .status()
                .await
            {
                Ok(status) => {
                    yield Ok(BuildEvent {
                        success: status.success(),
                        detail: json!({ "state": "exited", "code": status.code() }),
                    });
                }
                Err(error) => {
                    yield Err(BuildError::new(format!(
                        "failed to spawn '{command}': {error}"
                    )));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::Arc;

    use futures_util::StreamExt;

    use conductor_core::conductor::Conductor;
    use conductor_core::context::PartialContext;
    use conductor_types::target::TargetSpecifier;

    use crate::loader::RegistryLoader;
    use crate::resolver::DirPackageResolver;
    use crate::workspace::FileWorkspace;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    /// Lay out a workspace with one project whose `check` target runs the
    /// shell builder.
    fn scaffold(root: &Path, command_options: &str) {
        write(
            &root.join("workspace.json"),
            &format!(
                r#"{{
                    "projects": {{
                        "app": {{
                            "root": "apps/app",
                            "projectType": "application",
                            "targets": {{
                                "check": {{
                                    "builder": "shell-builder:shell",
                                    "options": {command_options}
                                }}
                            }}
                        }}
                    }}
                }}"#
            ),
        );
        write(
            &root.join("packages/shell-builder/manifest.json"),
            r#"{ "name": "shell-builder", "builders": "./builders.json" }"#,
        );
        write(
            &root.join("packages/shell-builder/builders.json"),
            r#"{
                "builders": {
                    "shell": {
                        "schema": "./schema.json",
                        "class": "./shell.builder",
                        "description": "Runs a shell command."
                    }
                }
            }"#,
        );
        write(
            &root.join("packages/shell-builder/schema.json"),
            r#"{
                "$id": "shell-builder-options",
                "type": "object",
                "properties": {
                    "command": { "type": "string" },
                    "args": { "type": "array", "items": { "type": "string" } },
                    "cwd": { "type": "string" }
                },
                "required": ["command"]
            }"#,
        );
        write(
            &root.join("packages/shell-builder/shell.builder"),
            r#"{ "builder": "shell" }"#,
        );
        std::fs::create_dir_all(root.join("apps/app")).unwrap();
    }

    async fn conductor_for(root: &Path) -> Conductor<FileWorkspace> {
        let workspace = Arc::new(
            FileWorkspace::load(&root.join("workspace.json"))
                .await
                .unwrap(),
        );
        let loader = RegistryLoader::new();
        loader.register("shell", Arc::new(ShellBuilderFactory));
        let conductor = Conductor::new(
            workspace,
            Arc::new(DirPackageResolver::new()),
            Arc::new(loader),
        );
        conductor.load().await.unwrap();
        conductor
    }

    #[tokio::test]
    async fn runs_a_command_through_the_full_stack() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), r#"{ "command": "true" }"#);
        let conductor = conductor_for(dir.path()).await;

        let config = conductor
            .builder_configuration(&TargetSpecifier::new("app", "check"))
            .unwrap();
        let events: Vec<_> = conductor
            .run(config, PartialContext::default())
            .await
            .unwrap()
            .collect()
            .await;

        let events: Vec<BuildEvent> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events[0].detail["state"], "started");
        assert!(events[1].success);
        assert_eq!(events[1].detail["code"], 0);
    }

    #[tokio::test]
    async fn reports_a_failing_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), r#"{ "command": "false" }"#);
        let conductor = conductor_for(dir.path()).await;

        let config = conductor
            .builder_configuration(&TargetSpecifier::new("app", "check"))
            .unwrap();
        let events: Vec<_> = conductor
            .run(config, PartialContext::default())
            .await
            .unwrap()
            .collect()
            .await;

        let last = events.last().unwrap().as_ref().unwrap();
        assert!(!last.success);
    }

    #[tokio::test]
    async fn missing_command_option_fails_schema_validation() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), r#"{ "args": ["-l"] }"#);
        let conductor = conductor_for(dir.path()).await;

        let config = conductor
            .builder_configuration(&TargetSpecifier::new("app", "check"))
            .unwrap();
        let err = conductor
            .run(config, PartialContext::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            conductor_types::error::ConductorError::SchemaValidation { .. }
        ));
    }

    #[tokio::test]
    async fn unspawnable_command_fails_inside_the_stream() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(
            dir.path(),
            r#"{ "command": "conductor-no-such-binary-here" }"#,
        );
        let conductor = conductor_for(dir.path()).await;

        let config = conductor
            .builder_configuration(&TargetSpecifier::new("app", "check"))
            .unwrap();
        let events: Vec<_> = conductor
            .run(config, PartialContext::default())
            .await
            .unwrap()
            .collect()
            .await;

        assert!(events.last().unwrap().is_err());
    }
}
