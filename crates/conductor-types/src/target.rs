//! Target declarations and run-request types.
//!
//! A target binds a builder identifier to a base option set and optional
//! named configurations (partial override sets). A `TargetSpecifier` is the
//! request value naming one target to run; a `BuilderConfiguration` is the
//! fully merged result handed to a builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A JSON object of builder options.
pub type Options = Map<String, Value>;

/// A named, buildable unit within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    /// Builder identifier in `package:name` form.
    pub builder: String,
    /// Base option set handed to the builder.
    #[serde(default)]
    pub options: Options,
    /// Named partial override sets, applied on top of the base options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<HashMap<String, Options>>,
}

/// A project's mapping of target name to target declaration.
pub type TargetMap = HashMap<String, Target>;

/// A request to run one target of one project.
///
/// Constructed per call, never persisted. The string form accepted from the
/// command line is `project:target` or `project:target:configuration`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSpecifier {
    pub project: String,
    pub target: String,
    pub configuration: Option<String>,
    pub overrides: Option<Options>,
}

impl TargetSpecifier {
    pub fn new(project: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            target: target.into(),
            configuration: None,
            overrides: None,
        }
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    pub fn with_overrides(mut self, overrides: Options) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// Error for malformed target specifier strings.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid target specifier '{0}', expected project:target[:configuration]")]
pub struct InvalidTargetSpecifier(pub String);

impl FromStr for TargetSpecifier {
    type Err = InvalidTargetSpecifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (project, target, configuration) = (parts.next(), parts.next(), parts.next());
        if parts.next().is_some() {
            return Err(InvalidTargetSpecifier(s.to_string()));
        }
        match (project, target) {
            (Some(project), Some(target)) if !project.is_empty() && !target.is_empty() => {
                Ok(Self {
                    project: project.to_string(),
                    target: target.to_string(),
                    configuration: configuration
                        .filter(|c| !c.is_empty())
                        .map(str::to_string),
                    overrides: None,
                })
            }
            _ => Err(InvalidTargetSpecifier(s.to_string())),
        }
    }
}

/// The fully merged, validated input handed to a builder at execution time.
///
/// The option set is `base options ⊕ named-configuration overrides ⊕ caller
/// overrides`, later keys winning, shallow merge only. During option
/// validation the merged set is replaced by the validated/coerced result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderConfiguration {
    /// Root location of the project being built.
    pub root: PathBuf,
    /// The project's type tag.
    #[serde(rename = "projectType")]
    pub project_type: String,
    /// Builder identifier in `package:name` form.
    pub builder: String,
    /// The final option set.
    pub options: Options,
}
