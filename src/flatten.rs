//! Lowering of named object schemas into the struct IR.
//!
//! Only named entry points (`Kind::SchemaEnter`) are flattened: they are the
//! schemas with a stable name to use as a C type name. Nested objects are
//! reached by recursion from their entry and named `{parent}_{property}`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FlattenError;
use crate::ir::{CType, Dim, Field, Struct};
use crate::location::Location;
use crate::node::{Grammar, Kind};
use crate::walk::{walk, Step};

/// Every struct lowered from the input, plus every schema that could not be.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenResult {
    /// Dependency ordered: a struct follows every struct it references.
    pub structs: Vec<Struct>,
    pub errors: Vec<FlattenError>,
}

impl FlattenResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

const COMBINATORS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

fn number_type(format: &str) -> Option<&'static str> {
    Some(match format {
        "uint8" => "uint8_t",
        "int8" => "int8_t",
        "uint16" => "uint16_t",
        "int16" => "int16_t",
        "uint32" => "uint32_t",
        "int32" => "int32_t",
        "uint64" => "uint64_t",
        "int64" => "int64_t",
        "float" => "float",
        "double" => "double",
        _ => return None,
    })
}

/// Flatten every named object schema found in `trees`.
///
/// An error discards the entry it occurred in; sibling entries still
/// flatten.
pub fn flatten<'a, I>(grammar: &Grammar, trees: I) -> FlattenResult
where
    I: IntoIterator<Item = &'a Value>,
{
    let result = walk(grammar, trees)
        .filter(|step| step.kind == Kind::SchemaEnter)
        .fold(FlattenResult::default(), |mut acc, step| {
            match flatten_entry(&step) {
                Ok(structs) => acc.structs.extend(structs),
                Err(err) => acc.errors.push(err),
            }
            acc
        });
    debug!(
        structs = result.structs.len(),
        errors = result.errors.len(),
        "flattened schemas"
    );
    result
}

fn flatten_entry(step: &Step<'_>) -> Result<Vec<Struct>, FlattenError> {
    let Some(schema) = step.value.as_object() else {
        return Ok(Vec::new());
    };
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(Vec::new());
    }
    let name = step.location.last().unwrap_or("unknown");
    let mut structs = Vec::new();
    flatten_object(name, schema, &step.location, &mut structs)?;
    Ok(structs)
}

/// `$ref` and the combinators cannot be lowered to a plain struct.
fn unsupported(schema: &Map<String, Value>) -> Option<String> {
    if schema.contains_key("$ref") {
        return Some("$ref is not supported".into());
    }
    COMBINATORS
        .iter()
        .find(|k| schema.contains_key(**k))
        .map(|keyword| format!("{keyword} is not supported"))
}

/// Push the structs of `schema`'s nested objects, then its own.
fn flatten_object(
    name: &str,
    schema: &Map<String, Value>,
    location: &Location,
    structs: &mut Vec<Struct>,
) -> Result<(), FlattenError> {
    if let Some(message) = unsupported(schema) {
        return Err(FlattenError::new(location.clone(), message));
    }
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        let base = location.push("properties");
        for (prop, prop_schema) in properties {
            let prop_location = base.push(prop.as_str());
            let ctype = resolve_type(name, prop, prop_schema, &prop_location, structs)?;
            fields.push(Field::new(
                prop.as_str(),
                ctype,
                required.contains(&prop.as_str()),
            ));
        }
    }

    structs.push(Struct {
        ctype: CType::new(name),
        location: location.clone(),
        fields,
    });
    Ok(())
}

fn resolve_type(
    parent: &str,
    prop: &str,
    schema: &Value,
    location: &Location,
    structs: &mut Vec<Struct>,
) -> Result<CType, FlattenError> {
    let fail = |message: String| FlattenError::new(location.clone(), message);

    let Some(schema) = schema.as_object() else {
        return Err(fail(format!("expected a schema object, got {schema}")));
    };
    if let Some(message) = unsupported(schema) {
        return Err(fail(message));
    }

    match schema.get("type") {
        Some(Value::String(ty)) => match ty.as_str() {
            "object" => {
                let name = format!("{parent}_{prop}");
                flatten_object(&name, schema, location, structs)?;
                Ok(CType::new(name))
            }
            "array" => resolve_array(parent, prop, schema, location, structs),
            "number" | "integer" => {
                let format = schema.get("format").and_then(Value::as_str).unwrap_or("");
                number_type(format)
                    .map(CType::new)
                    .ok_or_else(|| fail(format!("{ty} without recognized format: \"{format}\"")))
            }
            "string" => {
                let len = bound(schema, "maxLength").map_err(fail)?;
                let len = len.ok_or_else(|| fail("string without maxLength".into()))?;
                Ok(CType::with_dims("uint8_t", vec![Dim::fixed(len)]))
            }
            "bool" | "boolean" => Ok(CType::new("bool")),
            "null" => Err(fail("null type is not supported".into())),
            other => Err(fail(format!("unknown schema type: {other}"))),
        },
        Some(other) => Err(fail(format!("unsupported schema type: {other}"))),
        None => Err(fail("schema without type".into())),
    }
}

fn resolve_array(
    parent: &str,
    prop: &str,
    schema: &Map<String, Value>,
    location: &Location,
    structs: &mut Vec<Struct>,
) -> Result<CType, FlattenError> {
    let fail = |message: String| FlattenError::new(location.clone(), message);

    let max = bound(schema, "maxItems")
        .map_err(fail)?
        .ok_or_else(|| fail("array without maxItems".into()))?;
    let min = bound(schema, "minItems").map_err(fail)?.unwrap_or(0);
    if min > max {
        return Err(fail(format!("minItems {min} exceeds maxItems {max}")));
    }
    let items = schema
        .get("items")
        .ok_or_else(|| fail("array without items".into()))?;

    let inner = resolve_type(parent, prop, items, &location.push("items"), structs)?;
    let mut dims = Vec::with_capacity(inner.dims.len() + 1);
    dims.push(Dim::new(min, max));
    dims.extend(inner.dims);
    Ok(CType::with_dims(inner.name, dims))
}

/// Read a non-negative integer constraint, `Ok(None)` when absent.
fn bound(schema: &Map<String, Value>, keyword: &str) -> Result<Option<u64>, String> {
    match schema.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("{keyword} must be a non-negative integer, got {value}")),
    }
}
