//! Builder identity, manifest shapes, and resolved descriptions.
//!
//! A builder is addressed as `package:name`. Resolution walks from the
//! owning package's manifest (which points at a plugin manifest) to the
//! named entry, whose `schema` and `class` locations are resolved relative
//! to the plugin manifest's directory.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConductorError;

/// A builder identifier of the form `package:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuilderId {
    /// The package owning the builder.
    pub package: String,
    /// The builder's name within the package's plugin manifest.
    pub name: String,
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.name)
    }
}

impl FromStr for BuilderId {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((package, name)) if !package.is_empty() && !name.is_empty() => Ok(Self {
                package: package.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ConductorError::BuilderCannotBeResolved(s.to_string())),
        }
    }
}

/// The package-level manifest of a builder package.
///
/// Only the `builders` pointer matters to resolution; a package without one
/// cannot provide builders.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Package name, informational.
    #[serde(default)]
    pub name: Option<String>,
    /// Relative path to the package's plugin manifest.
    #[serde(default)]
    pub builders: Option<PathBuf>,
}

/// One entry of a plugin manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderEntry {
    /// Relative path to the builder's option schema document.
    pub schema: PathBuf,
    /// Relative path to the builder's implementation module.
    #[serde(rename = "class")]
    pub implementation: PathBuf,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A package's plugin manifest: builder name to entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    pub builders: HashMap<String, BuilderEntry>,
}

/// Resolved, absolute locations for one builder.
///
/// Derived once per builder identifier and cached for the orchestrator's
/// lifetime; there is no hot-reload.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderPaths {
    /// Absolute location of the option schema document.
    pub schema: PathBuf,
    /// Absolute location of the implementation module.
    pub implementation: PathBuf,
    /// Human-readable description from the plugin manifest entry.
    pub description: Option<String>,
}

/// Assembled description of a resolved builder: identity, loaded option
/// schema, and description text. Immutable once cached.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderDescription {
    pub id: BuilderId,
    /// The builder's option schema document.
    pub schema: Value,
    pub description: Option<String>,
}

/// An implementation module descriptor.
///
/// The document found at a builder entry's `class` location; it names the
/// factory export the module loader should yield.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDescriptor {
    /// Name of the factory export.
    pub builder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_id_round_trips() {
        let id: BuilderId = "my-pkg:build".parse().unwrap();
        assert_eq!(id.package, "my-pkg");
        assert_eq!(id.name, "build");
        assert_eq!(id.to_string(), "my-pkg:build");
    }

    #[test]
    fn builder_id_rejects_malformed_input() {
        for input in ["build", "my-pkg:", ":build", ""] {
            let err = input.parse::<BuilderId>().unwrap_err();
            assert!(matches!(err, ConductorError::BuilderCannotBeResolved(_)));
        }
    }

    #[test]
    fn plugin_manifest_entry_uses_class_key() {
        let manifest: PluginManifest = serde_json::from_value(serde_json::json!({
            "builders": {
                "build": {
                    "schema": "./schema.json",
                    "class": "./build.builder",
                    "description": "Builds the project."
                }
            }
        }))
        .unwrap();
        let entry = &manifest.builders["build"];
        assert_eq!(entry.implementation, PathBuf::from("./build.builder"));
        assert_eq!(entry.description.as_deref(), Some("Builds the project."));
    }

    #[test]
    fn package_manifest_without_pointer_deserializes() {
        let manifest: PackageManifest =
            serde_json::from_value(serde_json::json!({ "name": "plain" })).unwrap();
        assert!(manifest.builders.is_none());
    }
}
