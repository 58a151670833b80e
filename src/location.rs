//! Document locations.
//!
//! A [`Location`] is an ordered list of path segments addressing a position
//! inside a tree value. It converts to and from JSON Pointer (RFC 6901)
//! notation, where `~` is written `~0` and `/` is written `~1`.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Ordered path of segments into a tree value.
///
/// Equality, ordering and hashing are structural over the segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(Vec<String>);

impl Location {
    /// The empty location, addressing the whole tree.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new location with `segment` appended.
    pub fn push(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON Pointer. The root renders as the empty string.
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push('/');
            out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        out
    }

    /// Parse a JSON Pointer.
    ///
    /// The empty string is the root. A single leading `/` is consumed, so
    /// `"/"` is the one-segment location `[""]`. A pointer without a leading
    /// slash is read leniently as if it had one.
    pub fn from_pointer(pointer: &str) -> Self {
        if pointer.is_empty() {
            return Self::root();
        }
        let body = pointer.strip_prefix('/').unwrap_or(pointer);
        Self(
            body.split('/')
                .map(|s| s.replace("~1", "/").replace("~0", "~"))
                .collect(),
        )
    }

    /// Follow this location through `tree`.
    ///
    /// Object members are looked up by key, array elements by decimal index.
    /// Returns `None` when any segment does not exist.
    pub fn resolve<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        let mut current = tree;
        for segment in &self.0 {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pointer())
    }
}

impl<S: Into<String>> FromIterator<S> for Location {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Location {
    fn from(segments: [S; N]) -> Self {
        segments.into_iter().collect()
    }
}
