//! Loose JSON document loading.
//!
//! Schemas and manifests are hand-authored, so parsing tolerates comments
//! and trailing commas (the JSON5 dialect). No caching here -- callers
//! above decide what to cache.

use std::path::Path;

use serde_json::Value;

use conductor_types::error::ConductorError;

use crate::workspace::Workspace;

/// Read and parse the document at `path` through the workspace's read
/// capability.
pub async fn load_document<W: Workspace>(
    workspace: &W,
    path: &Path,
) -> Result<Value, ConductorError> {
    let bytes = workspace.read(path).await?;
    let text = String::from_utf8(bytes).map_err(|error| ConductorError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    parse_document(&text, path)
}

/// Parse `text` as a loose-dialect JSON document.
pub fn parse_document(text: &str, path: &Path) -> Result<Value, ConductorError> {
    json5::from_str(text).map_err(|error| ConductorError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

/// The identity a schema document declares for itself, used when reporting
/// validation failures: `$id` if present, else `title`, else a placeholder.
pub fn schema_identity(schema: &Value) -> String {
    schema
        .get("$id")
        .or_else(|| schema.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("<anonymous schema>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_dialect() {
        let doc = parse_document(
            r#"{
                // comments are tolerated in hand-authored manifests
                "builders": "./builders.json",
            }"#,
            Path::new("manifest.json"),
        )
        .unwrap();
        assert_eq!(doc["builders"], "./builders.json");
    }

    #[test]
    fn parse_failure_names_the_document() {
        let err = parse_document("{ not json", Path::new("broken.json")).unwrap_err();
        match err {
            ConductorError::Parse { path, .. } => {
                assert_eq!(path, Path::new("broken.json"))
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn schema_identity_prefers_id_over_title() {
        let schema = serde_json::json!({ "$id": "targets", "title": "Target map" });
        assert_eq!(schema_identity(&schema), "targets");
        let schema = serde_json::json!({ "title": "Target map" });
        assert_eq!(schema_identity(&schema), "Target map");
        assert_eq!(schema_identity(&serde_json::json!({})), "<anonymous schema>");
    }
}
