//! Workspace config validation.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::error::SchemaError;

/// Shape every workspace config file must have.
pub fn config_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let paths = json!({"type": "array", "items": {"type": "string"}});
        json!({
            "type": "object",
            "required": ["resources"],
            "properties": {
                "resources": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "version"],
                        "properties": {
                            "name": {"type": "string"},
                            "version": {"type": "number"},
                            "openapi": paths,
                            "asyncapi": paths,
                            "if": paths
                        }
                    }
                }
            }
        })
    })
}

/// Validate a parsed config document against [`config_schema`].
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &Value) -> Result<(), Vec<SchemaError>> {
    validate_against_schema(config_schema(), config)
}

/// Validate `instance` against `schema`.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Result<(), Vec<SchemaError>> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        vec![SchemaError {
            path: String::new(),
            message: format!("invalid schema: {e}"),
        }]
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
