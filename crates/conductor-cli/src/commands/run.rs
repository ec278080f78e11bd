//! `conductor run` -- run one target and print its event stream.

use std::path::Path;

use futures_util::StreamExt;
use serde_json::Value;

use conductor_core::context::PartialContext;
use conductor_types::target::TargetSpecifier;

/// Run `target` (a `project:target[:configuration]` string) with the given
/// option overrides. Returns whether every event reported success.
pub async fn run(
    workspace: &Path,
    target: &str,
    overrides: Vec<(String, Value)>,
) -> anyhow::Result<bool> {
    let conductor = super::conductor(workspace).await?;

    let mut spec: TargetSpecifier = target.parse()?;
    if !overrides.is_empty() {
        spec.overrides = Some(overrides.into_iter().collect());
    }

    let config = conductor.builder_configuration(&spec)?;
    tracing::info!(builder = %config.builder, "running target");

    let context =
        PartialContext::default().with_logger(tracing::info_span!("build", target = %target));
    let mut events = conductor.run(config, context).await?;

    let mut success = true;
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                success &= event.success;
                if event.detail.is_null() {
                    println!("event: success={}", event.success);
                } else {
                    println!("event: success={} {}", event.success, event.detail);
                }
            }
            Err(error) => {
                eprintln!("build error: {error}");
                success = false;
            }
        }
    }
    Ok(success)
}

/// Parse a `key=value` override; the value parses as (loose) JSON where
/// possible and falls back to a plain string.
pub fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("expected key=value, got '{raw}'"));
    }
    let value = json5::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
