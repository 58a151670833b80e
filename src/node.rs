//! Traversal nodes and the grammar arena that wires them together.
//!
//! A [`Grammar`] describes which document shape governs each position of a
//! tree. Nodes are stored in an arena and refer to each other by [`NodeId`],
//! so cyclic shapes (a schema holding a map of schemas) need no shared
//! mutable state: ids are declared first, tables are filled in second, and
//! the finished grammar is immutable.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::behavior::Behavior;

/// Tag identifying the document shape a node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Data,
    // JSON Schema
    Schema,
    SchemaEnter,
    SchemaRoot,
    MapSchema,
    MapSchemaEnter,
    MapStringSet,
    // OpenAPI objects
    Root,
    Info,
    Components,
    PathItem,
    Operation,
    Parameter,
    RequestBody,
    Response,
    MediaType,
    Encoding,
    Server,
    ServerVar,
    Link,
    // OpenAPI uniform maps
    MapPathItem,
    MapResponse,
    MapContent,
    MapHeader,
    MapEncoding,
    MapParameter,
    MapRequestBody,
    MapLink,
    MapCallback,
    MapServerVar,
    MapScope,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Data => "data",
            Kind::Schema => "schema",
            Kind::SchemaEnter => "schema_enter",
            Kind::SchemaRoot => "schema_root",
            Kind::MapSchema => "map_schema",
            Kind::MapSchemaEnter => "map_schema_enter",
            Kind::MapStringSet => "map_string_set",
            Kind::Root => "root",
            Kind::Info => "info",
            Kind::Components => "components",
            Kind::PathItem => "path_item",
            Kind::Operation => "operation",
            Kind::Parameter => "parameter",
            Kind::RequestBody => "request_body",
            Kind::Response => "response",
            Kind::MediaType => "media_type",
            Kind::Encoding => "encoding",
            Kind::Server => "server",
            Kind::ServerVar => "server_var",
            Kind::Link => "link",
            Kind::MapPathItem => "map_path_item",
            Kind::MapResponse => "map_response",
            Kind::MapContent => "map_content",
            Kind::MapHeader => "map_header",
            Kind::MapEncoding => "map_encoding",
            Kind::MapParameter => "map_parameter",
            Kind::MapRequestBody => "map_request_body",
            Kind::MapLink => "map_link",
            Kind::MapCallback => "map_callback",
            Kind::MapServerVar => "map_server_var",
            Kind::MapScope => "map_scope",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node inside its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The data trap. Every grammar allocates it first.
    pub const DATA: NodeId = NodeId(0);
}

/// Child node and the behavior to apply there.
pub type Transition = (NodeId, Behavior);

/// Property name → transition lookup table.
pub type Table = HashMap<&'static str, Transition>;

/// A traversal node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Opaque trap. Every property leads back here.
    Data,
    /// Every property leads to the same child with the same behavior.
    Map {
        kind: Kind,
        child: NodeId,
        behavior: Behavior,
    },
    /// Per-property table. Unknown properties lead to data.
    Object { kind: Kind, table: Table },
    /// JSON Schema keyword dispatch. `x-` properties lead to data, known
    /// keywords use the table, anything else is taken as a nested schema.
    SchemaKeyword {
        kind: Kind,
        keywords: Table,
        fallback: NodeId,
    },
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Data => Kind::Data,
            Node::Map { kind, .. } | Node::Object { kind, .. } | Node::SchemaKeyword { kind, .. } => {
                *kind
            }
        }
    }

    /// True only for the data trap.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Node::Data)
    }

    /// Transition for `prop`. Total: every property has a target.
    pub fn child(&self, prop: &str) -> Transition {
        match self {
            Node::Data => (NodeId::DATA, Behavior::default()),
            Node::Map {
                child, behavior, ..
            } => (*child, *behavior),
            Node::Object { table, .. } => table
                .get(prop)
                .copied()
                .unwrap_or((NodeId::DATA, Behavior::default())),
            Node::SchemaKeyword {
                keywords, fallback, ..
            } => {
                if prop.starts_with("x-") {
                    (NodeId::DATA, Behavior::default())
                } else {
                    keywords
                        .get(prop)
                        .copied()
                        .unwrap_or((*fallback, Behavior::default()))
                }
            }
        }
    }
}

/// Immutable set of nodes describing one document family.
#[derive(Debug, Clone)]
pub struct Grammar {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Grammar {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Root transition with default behavior.
    pub fn entry(&self) -> Transition {
        (self.root, Behavior::default())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> Kind {
        self.node(id).kind()
    }

    pub fn is_opaque(&self, id: NodeId) -> bool {
        self.node(id).is_opaque()
    }

    pub fn child(&self, id: NodeId, prop: &str) -> Transition {
        self.node(id).child(prop)
    }
}

enum Slot {
    Declared(Kind),
    Ready(Node),
}

/// Two-phase grammar construction.
///
/// [`declare`](Self::declare) every node first, then configure each one.
/// Configuration may reference any declared id, including ids configured
/// later.
pub struct GrammarBuilder {
    slots: Vec<Slot>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::Ready(Node::Data)],
        }
    }

    pub fn declare(&mut self, kind: Kind) -> NodeId {
        self.slots.push(Slot::Declared(kind));
        NodeId(self.slots.len() - 1)
    }

    fn declared_kind(&self, id: NodeId) -> Kind {
        match &self.slots[id.0] {
            Slot::Declared(kind) => *kind,
            Slot::Ready(node) => node.kind(),
        }
    }

    pub fn map(&mut self, id: NodeId, child: NodeId, behavior: Behavior) -> &mut Self {
        let kind = self.declared_kind(id);
        self.slots[id.0] = Slot::Ready(Node::Map {
            kind,
            child,
            behavior,
        });
        self
    }

    pub fn object<I>(&mut self, id: NodeId, table: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'static str, Transition)>,
    {
        let kind = self.declared_kind(id);
        self.slots[id.0] = Slot::Ready(Node::Object {
            kind,
            table: table.into_iter().collect(),
        });
        self
    }

    pub fn schema(&mut self, id: NodeId, keywords: Table, fallback: NodeId) -> &mut Self {
        let kind = self.declared_kind(id);
        self.slots[id.0] = Slot::Ready(Node::SchemaKeyword {
            kind,
            keywords,
            fallback,
        });
        self
    }

    /// Finish construction.
    ///
    /// # Panics
    ///
    /// Panics if a declared node was never configured. That is a bug in the
    /// grammar definition, not an input error.
    pub fn build(self, root: NodeId) -> Grammar {
        let nodes = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Ready(node) => node,
                Slot::Declared(kind) => panic!("grammar node `{}` was never configured", kind),
            })
            .collect();
        Grammar { nodes, root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::SortKey;

    fn tiny() -> (Grammar, NodeId, NodeId) {
        let mut b = GrammarBuilder::new();
        let obj = b.declare(Kind::Root);
        let map = b.declare(Kind::MapSchema);
        let schema = b.declare(Kind::Schema);
        b.object(obj, [("items", (map, Behavior::default()))]);
        b.map(map, schema, Behavior::sorted(SortKey::Str));
        b.schema(
            schema,
            Table::from([("required", (schema, Behavior::sorted(SortKey::Str)))]),
            schema,
        );
        (b.build(obj), map, schema)
    }

    #[test]
    fn data_traps_everything() {
        let (g, _, _) = tiny();
        assert!(g.is_opaque(NodeId::DATA));
        assert_eq!(g.kind(NodeId::DATA), Kind::Data);
        assert_eq!(g.child(NodeId::DATA, "anything"), (NodeId::DATA, Behavior::default()));
    }

    #[test]
    fn object_unknown_property_is_data() {
        let (g, map, _) = tiny();
        assert_eq!(g.child(g.root(), "items").0, map);
        assert_eq!(g.child(g.root(), "unknown"), (NodeId::DATA, Behavior::default()));
        assert!(!g.is_opaque(g.root()));
    }

    #[test]
    fn map_is_uniform() {
        let (g, map, schema) = tiny();
        assert_eq!(g.child(map, "a"), g.child(map, "b"));
        assert_eq!(g.child(map, "a"), (schema, Behavior::sorted(SortKey::Str)));
    }

    #[test]
    fn schema_dispatch_priorities() {
        let (g, _, schema) = tiny();
        assert_eq!(
            g.child(schema, "required"),
            (schema, Behavior::sorted(SortKey::Str))
        );
        assert_eq!(g.child(schema, "items"), (schema, Behavior::default()));
        assert_eq!(g.child(schema, "x-vendor"), (NodeId::DATA, Behavior::default()));
    }

    #[test]
    #[should_panic(expected = "never configured")]
    fn unconfigured_node_is_fatal() {
        let mut b = GrammarBuilder::new();
        let root = b.declare(Kind::Root);
        let _dangling = b.declare(Kind::Info);
        b.object(root, Table::new());
        b.build(root);
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(Kind::SchemaEnter.as_str(), "schema_enter");
        assert_eq!(
            serde_json::to_value(Kind::MapRequestBody).unwrap(),
            serde_json::json!("map_request_body")
        );
    }
}
