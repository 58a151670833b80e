//! Built-in grammars: OpenAPI 3.1 and raw JSON Schema.
//!
//! Both share one schema keyword table. Named entry points (schemas that
//! have a stable name usable as a generated type name) are reached through
//! a `map_schema_enter` node and carry the `schema_enter` kind; everything
//! reached recursively is plain `schema`.

use crate::behavior::{Behavior, ConflictPolicy, SortKey};
use crate::node::{Grammar, GrammarBuilder, Kind, NodeId, Table};

const NONE: Behavior = Behavior {
    sort_key: None,
    conflict_policy: ConflictPolicy::Keep,
};
const BY_STR: Behavior = Behavior::sorted(SortKey::Str);
const CANONICAL: Behavior = Behavior::sorted(SortKey::Canonical);
const PARAMETER_IDENTITY: Behavior = Behavior::sorted(SortKey::Identity(&["in", "name"]));

/// Ids of the schema sub-grammar inside a larger grammar.
struct SchemaNodes {
    schema: NodeId,
    map_schema_enter: NodeId,
    keywords: Table,
}

/// Declare and configure the JSON Schema nodes.
fn schema_nodes(b: &mut GrammarBuilder) -> SchemaNodes {
    let data = NodeId::DATA;
    let schema = b.declare(Kind::Schema);
    let schema_enter = b.declare(Kind::SchemaEnter);
    let map_schema = b.declare(Kind::MapSchema);
    let map_schema_enter = b.declare(Kind::MapSchemaEnter);
    let map_string_set = b.declare(Kind::MapStringSet);

    b.map(map_schema, schema, NONE);
    b.map(map_schema_enter, schema_enter, NONE);
    b.map(map_string_set, data, BY_STR);

    let keywords = schema_keywords(schema, map_schema, map_string_set);
    b.schema(schema, keywords.clone(), schema);
    b.schema(schema_enter, keywords.clone(), schema);

    SchemaNodes {
        schema,
        map_schema_enter,
        keywords,
    }
}

#[rustfmt::skip]
fn schema_keywords(schema: NodeId, map_schema: NodeId, map_string_set: NodeId) -> Table {
    let data = NodeId::DATA;
    Table::from([
        // user-named maps of sub-schemas
        ("properties",          (map_schema, NONE)),
        ("$defs",               (map_schema, NONE)),
        ("definitions",         (map_schema, NONE)),
        ("patternProperties",   (map_schema, NONE)),
        ("dependentSchemas",    (map_schema, NONE)),
        ("dependentRequired",   (map_string_set, NONE)),
        // instance data, not schemas
        ("default",             (data, NONE)),
        ("example",             (data, NONE)),
        ("const",               (data, NONE)),
        ("examples",            (data, CANONICAL)),
        // OpenAPI / AsyncAPI objects embedded in schemas
        ("discriminator",       (data, NONE)),
        ("xml",                 (data, NONE)),
        ("externalDocs",        (data, NONE)),
        // set-like arrays
        ("required",            (schema, BY_STR)),
        ("type",                (schema, BY_STR)),
        ("enum",                (schema, CANONICAL)),
        ("allOf",               (schema, CANONICAL)),
        ("anyOf",               (schema, CANONICAL)),
        ("oneOf",               (schema, CANONICAL)),
    ])
}

impl Grammar {
    /// Grammar of a raw JSON Schema document.
    ///
    /// The root is a schema whose `$defs` / `definitions` entries are named
    /// entry points.
    pub fn json_schema() -> Grammar {
        let mut b = GrammarBuilder::new();
        let s = schema_nodes(&mut b);
        let root = b.declare(Kind::SchemaRoot);

        let mut keywords = s.keywords.clone();
        keywords.insert("$defs", (s.map_schema_enter, NONE));
        keywords.insert("definitions", (s.map_schema_enter, NONE));
        b.schema(root, keywords, s.schema);
        b.build(root)
    }

    /// Grammar of an OpenAPI 3.1 document.
    ///
    /// `components.schemas` entries are named entry points.
    #[rustfmt::skip]
    pub fn openapi_3_1() -> Grammar {
        let data = NodeId::DATA;
        let mut b = GrammarBuilder::new();
        let s = schema_nodes(&mut b);

        let root             = b.declare(Kind::Root);
        let info             = b.declare(Kind::Info);
        let components       = b.declare(Kind::Components);
        let path_item        = b.declare(Kind::PathItem);
        let operation        = b.declare(Kind::Operation);
        let parameter        = b.declare(Kind::Parameter);
        let request_body     = b.declare(Kind::RequestBody);
        let response         = b.declare(Kind::Response);
        let media_type       = b.declare(Kind::MediaType);
        let encoding         = b.declare(Kind::Encoding);
        let server           = b.declare(Kind::Server);
        let server_var       = b.declare(Kind::ServerVar);
        let link             = b.declare(Kind::Link);

        let map_path_item    = b.declare(Kind::MapPathItem);
        let map_response     = b.declare(Kind::MapResponse);
        let map_content      = b.declare(Kind::MapContent);
        let map_header       = b.declare(Kind::MapHeader);
        let map_encoding     = b.declare(Kind::MapEncoding);
        let map_parameter    = b.declare(Kind::MapParameter);
        let map_request_body = b.declare(Kind::MapRequestBody);
        let map_link         = b.declare(Kind::MapLink);
        let map_callback     = b.declare(Kind::MapCallback);
        let map_server_var   = b.declare(Kind::MapServerVar);
        let map_scope        = b.declare(Kind::MapScope);

        b.object(root, [
            ("info",            (info, NONE)),
            ("paths",           (map_path_item, NONE)),
            ("webhooks",        (map_path_item, NONE)),
            ("components",      (components, NONE)),
            ("servers",         (server, NONE)),
            ("security",        (map_scope, CANONICAL)),
        ]);
        b.object(info, Table::new());
        b.object(components, [
            ("schemas",         (s.map_schema_enter, NONE)),
            ("parameters",      (map_parameter, NONE)),
            ("headers",         (map_header, NONE)),
            ("requestBodies",   (map_request_body, NONE)),
            ("responses",       (map_response, NONE)),
            ("pathItems",       (map_path_item, NONE)),
            ("callbacks",       (map_callback, NONE)),
            ("links",           (map_link, NONE)),
        ]);
        b.object(path_item, [
            ("get",             (operation, NONE)),
            ("put",             (operation, NONE)),
            ("post",            (operation, NONE)),
            ("delete",          (operation, NONE)),
            ("options",         (operation, NONE)),
            ("head",            (operation, NONE)),
            ("patch",           (operation, NONE)),
            ("trace",           (operation, NONE)),
            ("parameters",      (parameter, PARAMETER_IDENTITY)),
            ("servers",         (server, NONE)),
        ]);
        b.object(operation, [
            ("requestBody",     (request_body, NONE)),
            ("responses",       (map_response, NONE)),
            ("callbacks",       (map_callback, NONE)),
            ("parameters",      (parameter, PARAMETER_IDENTITY)),
            ("servers",         (server, NONE)),
            ("security",        (map_scope, CANONICAL)),
            ("tags",            (data, BY_STR)),
        ]);
        b.object(parameter, [
            ("schema",          (s.schema, NONE)),
            ("content",         (map_content, NONE)),
        ]);
        b.object(request_body, [
            ("content",         (map_content, NONE)),
        ]);
        b.object(response, [
            ("content",         (map_content, NONE)),
            ("headers",         (map_header, NONE)),
            ("links",           (map_link, NONE)),
        ]);
        b.object(media_type, [
            ("schema",          (s.schema, NONE)),
            ("encoding",        (map_encoding, NONE)),
        ]);
        b.object(encoding, [
            ("headers",         (map_header, NONE)),
        ]);
        b.object(server, [
            ("variables",       (map_server_var, NONE)),
        ]);
        b.object(server_var, [
            ("enum",            (data, BY_STR)),
        ]);
        b.object(link, [
            ("server",          (server, NONE)),
        ]);

        b.map(map_path_item,    path_item, NONE);
        b.map(map_response,     response, NONE);
        b.map(map_content,      media_type, NONE);
        b.map(map_header,       parameter, NONE);
        b.map(map_encoding,     encoding, NONE);
        b.map(map_parameter,    parameter, NONE);
        b.map(map_request_body, request_body, NONE);
        b.map(map_link,         link, NONE);
        b.map(map_callback,     map_path_item, NONE);
        b.map(map_server_var,   server_var, NONE);
        b.map(map_scope,        data, BY_STR);

        b.build(root)
    }
}
