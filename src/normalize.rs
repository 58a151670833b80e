//! Canonical rewriting of a document driven by a grammar.

use serde_json::{Map, Value};

use crate::node::{Grammar, Transition};
use crate::reference::{Reference, Scheme};

/// Key whose string value is a reference.
pub const REF_KEY: &str = "$ref";

/// Normalize a whole document starting at the grammar's root.
///
/// `$ref` strings outside data traps are rewritten for `scheme`, set-like
/// sequences are stably sorted by their sort key, and everything else is
/// copied unchanged. The result is idempotent under a second call.
pub fn normalize(value: &Value, grammar: &Grammar, scheme: &Scheme) -> Value {
    normalize_at(value, grammar, grammar.entry(), scheme)
}

/// Normalize `value` in an explicit `(node, behavior)` context.
pub fn normalize_at(
    value: &Value,
    grammar: &Grammar,
    context: Transition,
    scheme: &Scheme,
) -> Value {
    let (node, behavior) = context;
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                let normalized = match child {
                    Value::String(raw) if key == REF_KEY && !grammar.is_opaque(node) => {
                        Value::String(Reference::parse(raw).normalize(scheme))
                    }
                    _ if key == REF_KEY && !grammar.is_opaque(node) => child.clone(),
                    _ => normalize_at(child, grammar, grammar.child(node, key), scheme),
                };
                out.insert(key.clone(), normalized);
            }
            Value::Object(out)
        }
        Value::Array(arr) => {
            // one shape governs every element
            let mut items: Vec<Value> = arr
                .iter()
                .map(|item| normalize_at(item, grammar, context, scheme))
                .collect();
            if let Some(sort_key) = behavior.sort_key {
                items.sort_by_cached_key(|item| sort_key.key(item));
            }
            Value::Array(items)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn openapi(value: Value) -> Value {
        normalize(&value, &Grammar::openapi_3_1(), &Scheme::default())
    }

    #[test]
    fn sorts_required_and_type() {
        let doc = json!({
            "components": {"schemas": {"Pet": {
                "type": ["string", "null"],
                "required": ["name", "id"]
            }}}
        });
        let out = openapi(doc);
        let pet = &out["components"]["schemas"]["Pet"];
        assert_eq!(pet["required"], json!(["id", "name"]));
        assert_eq!(pet["type"], json!(["null", "string"]));
    }

    #[test]
    fn rewrites_refs_in_schema_context() {
        let doc = json!({
            "components": {"schemas": {
                "A": {"$ref": "./other.yaml#/components/schemas/B"},
                "C": {"properties": {"d": {"$ref": "forge://sdk/common/v0#/components/schemas/D"}}}
            }}
        });
        let out = openapi(doc);
        assert_eq!(
            out["components"]["schemas"]["A"]["$ref"],
            "#/components/schemas/B"
        );
        assert_eq!(
            out["components"]["schemas"]["C"]["properties"]["d"]["$ref"],
            "./sdk.openapi.yaml#/components/schemas/D"
        );
    }

    #[test]
    fn data_traps_are_untouched() {
        let doc = json!({
            "components": {"schemas": {"Pet": {
                "default": {"$ref": "./x.yaml#/y", "list": [3, 1, 2]},
                "x-meta": {"required": ["b", "a"]}
            }}}
        });
        let out = openapi(doc.clone());
        assert_eq!(out, doc);
    }

    #[test]
    fn ordered_arrays_keep_order() {
        let doc = json!({"servers": [{"url": "b"}, {"url": "a"}]});
        assert_eq!(openapi(doc.clone()), doc);
    }

    #[test]
    fn parameters_sorted_by_in_then_name() {
        let doc = json!({"paths": {"/p": {"get": {"parameters": [
            {"name": "b", "in": "query"},
            {"name": "z", "in": "path"},
            {"name": "a", "in": "query"}
        ]}}}});
        let out = openapi(doc);
        let names: Vec<&str> = out["paths"]["/p"]["get"]["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["z", "a", "b"]);
    }

    #[test]
    fn non_string_ref_is_copied() {
        let doc = json!({"components": {"schemas": {"A": {"$ref": 7}}}});
        assert_eq!(openapi(doc.clone()), doc);
    }

    #[test]
    fn idempotent() {
        let doc = json!({
            "paths": {"/p": {"get": {"tags": ["b", "a"], "security": [{"z": ["w", "r"]}, {"a": []}]}}},
            "components": {"schemas": {"S": {"enum": [3, 1, {"k": 2}], "$ref": "./s.yaml#/S"}}}
        });
        let once = openapi(doc);
        let twice = openapi(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn key_order_is_preserved() {
        let doc = json!({"info": {"version": "1", "title": "t"}, "openapi": "3.1.0"});
        let out = openapi(doc);
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["info", "openapi"]);
        let keys: Vec<&String> = out["info"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["version", "title"]);
    }
}
