//! JSON Schema validation gateway backed by the `jsonschema` crate.
//!
//! Validation semantics live entirely in the crate; this module compiles
//! the schema, applies top-level property defaults to the value (so the
//! returned value may differ from the input), and reports failures with
//! the schema's declared identity and the failing instance paths.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use conductor_core::document::schema_identity;
use conductor_types::error::ConductorError;

/// Validate `value` against `schema`, returning the validated value with
/// top-level defaults applied.
pub fn validate_against_schema(value: Value, schema: &Value) -> Result<Value, ConductorError> {
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|error| ConductorError::SchemaValidation {
            schema: schema_identity(schema),
            message: format!("schema does not compile: {error}"),
            value: Value::Null,
        })?;

    // Defaults first: a defaulted property may satisfy a `required` clause.
    let value = apply_defaults(value, schema);

    // The error iterator borrows `value`; collect messages before moving
    // the value into the error.
    let failure = match compiled.validate(&value) {
        Ok(()) => None,
        Err(errors) => {
            let mut messages = Vec::new();
            for (i, error) in errors.enumerate() {
                if i >= 10 {
                    messages.push("... (more schema errors omitted)".to_string());
                    break;
                }
                let path = error.instance_path.to_string();
                let path = if path.is_empty() {
                    "/".to_string()
                } else {
                    path
                };
                messages.push(format!("at {path}: {error}"));
            }
            Some(messages.join("; "))
        }
    };

    match failure {
        Some(message) => Err(ConductorError::SchemaValidation {
            schema: schema_identity(schema),
            message,
            value,
        }),
        None => Ok(value),
    }
}

/// Insert `default` values declared by the schema's top-level `properties`
/// into an object value where the key is absent. Shallow only.
fn apply_defaults(mut value: Value, schema: &Value) -> Value {
    let properties = schema.get("properties").and_then(Value::as_object);
    if let (Value::Object(map), Some(properties)) = (&mut value, properties) {
        for (key, property) in properties {
            if !map.contains_key(key) {
                if let Some(default) = property.get("default") {
                    map.insert(key.clone(), default.clone());
                }
            }
        }
    }
    value
}
