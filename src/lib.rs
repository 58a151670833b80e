//! jsmn-forge
//!
//! Normalize, merge, diff and flatten OpenAPI / JSON Schema documents.
//!
//! Every pass is driven by one declarative [`Grammar`] that says which
//! document shape governs each position in a tree: whether a sequence is a
//! set (sorted and merged by a sort key) or ordered, whether a `$ref` there
//! is live or just data, and which schemas are named entry points.
//!
//! # Example
//!
//! ```
//! use jsmn_forge::{merge, normalize, Grammar, Location, Scheme};
//! use serde_json::json;
//!
//! let grammar = Grammar::openapi_3_1();
//! let scheme = Scheme::default();
//!
//! let a = normalize(
//!     &json!({"components": {"schemas": {"Pet": {"required": ["name"]}}}}),
//!     &grammar,
//!     &scheme,
//! );
//! let b = normalize(
//!     &json!({"components": {"schemas": {"Pet": {"required": ["id", "name"]}}}}),
//!     &grammar,
//!     &scheme,
//! );
//!
//! let merged = merge(&a, &b, &grammar);
//! assert!(merged.conflicts.is_empty());
//!
//! let required = Location::from(["components", "schemas", "Pet", "required"]);
//! assert_eq!(required.resolve(&merged.value), Some(&json!(["id", "name"])));
//! ```
//!
//! # Pipeline
//!
//! | Pass | Input | Output |
//! |------|-------|--------|
//! | [`normalize`] | authored document | canonical document |
//! | [`merge`] / [`join`] | canonical documents | one document + conflicts |
//! | [`walk`] | documents | `(value, kind, location)` steps |
//! | [`flatten`] | documents | struct IR + errors |
//! | [`diff`] | any two trees | differences by location |

mod behavior;
mod diff;
mod error;
mod flatten;
mod grammar;
mod ir;
mod join;
mod loader;
mod location;
mod merge;
mod node;
mod normalize;
mod reference;
mod validator;
mod walk;
mod workspace;

pub use behavior::{canonical, Behavior, ConflictPolicy, SortKey};
pub use diff::{diff, extra, mismatch, missing, Diff, DiffEntry};
pub use error::{FlattenError, LoadError, SchemaError, WorkspaceError};
pub use flatten::{flatten, FlattenResult};
pub use ir::{CType, Dim, Field, FieldType, Struct};
pub use join::{join, JoinConflict, JoinResult};
pub use loader::{load_document, load_document_str};
pub use location::Location;
pub use merge::{merge, merge_all, merge_at, MergeConflict, MergeResult};
pub use node::{Grammar, GrammarBuilder, Kind, Node, NodeId, Table, Transition};
pub use normalize::{normalize, normalize_at, REF_KEY};
pub use reference::{
    Identity, Reference, ReferenceKind, Scheme, DEFAULT_EXTENSION, DEFAULT_SCHEME,
};
pub use validator::{config_schema, validate_against_schema, validate_config};
pub use walk::{walk, Step, Walk};
pub use workspace::{
    build_registry, discover, is_config_file, load_workspace, Entry, Registry, RegistryResult,
    ResourceConfig, Workspace, ID_KEY,
};
